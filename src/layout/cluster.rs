//! Cluster dendrogram layout.
//!
//! Places every leaf on one level and spaces leaves evenly along the breadth
//! axis; each parent sits at the mean of its children. Adjacent leaves that
//! share a parent are spaced by `sibling_separation`, leaves from different
//! parents by `cousin_separation`.
//!
//! # Algorithm Overview
//!
//! 1. **Flatten (pre-order):** Walk displayed children from the root,
//!    recording depth and parent.
//! 2. **Leaf pass:** Assign running breadth offsets to leaves left to right.
//! 3. **Bottom-up pass:** Centre parents over their children and record the
//!    height of each subtree.
//! 4. **Normalize:** Map breadth to `[0, size[0]]` with half a separation of
//!    padding at both ends, and height to `[0, size[1]]` with the root at 0.

use super::{HierarchyLayout, PlacedNode};
use crate::config::ClusterConfig;
use crate::graph::{EntityId, LineageStore};

/// Internal node data used during the cluster passes.
#[derive(Debug)]
struct ClusterNode {
    entity: EntityId,
    depth: u32,
    /// Parent index into the flattened list.
    parent: Option<usize>,
    children: Vec<usize>,
    x: f32,
    /// Longest path to a leaf.
    height: u32,
}

/// The cluster layout engine.
#[derive(Debug, Clone, Default)]
pub struct ClusterLayout {
    config: ClusterConfig,
}

impl ClusterLayout {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    fn separation(&self, a: usize, b: usize, nodes: &[ClusterNode]) -> f32 {
        if nodes[a].parent == nodes[b].parent {
            self.config.sibling_separation
        } else {
            self.config.cousin_separation
        }
    }

    fn flatten(store: &LineageStore, root: EntityId) -> Vec<ClusterNode> {
        let mut nodes: Vec<ClusterNode> = Vec::new();
        let mut stack: Vec<(EntityId, Option<usize>, u32)> = vec![(root, None, 0)];

        while let Some((entity, parent, depth)) = stack.pop() {
            let index = nodes.len();
            nodes.push(ClusterNode {
                entity,
                depth,
                parent,
                children: Vec::new(),
                x: 0.0,
                height: 0,
            });
            if let Some(p) = parent {
                nodes[p].children.push(index);
            }
            let children = store.entity(entity).branch.displayed();
            stack.extend(children.iter().rev().map(|&c| (c, Some(index), depth + 1)));
        }

        nodes
    }
}

impl HierarchyLayout for ClusterLayout {
    fn layout(&self, store: &LineageStore, root: EntityId, size: [f32; 2]) -> Vec<PlacedNode> {
        let mut nodes = Self::flatten(store, root);

        // Leaves in pre-order are already left to right.
        let mut previous_leaf: Option<usize> = None;
        let mut offset = 0.0f32;
        for i in 0..nodes.len() {
            if !nodes[i].children.is_empty() {
                continue;
            }
            if let Some(prev) = previous_leaf {
                offset += self.separation(i, prev, &nodes);
            }
            nodes[i].x = offset;
            previous_leaf = Some(i);
        }

        // Children follow their parent in pre-order, so a reverse sweep is bottom-up.
        for i in (0..nodes.len()).rev() {
            if nodes[i].children.is_empty() {
                continue;
            }
            let count = nodes[i].children.len() as f32;
            let sum: f32 = nodes[i].children.iter().map(|&c| nodes[c].x).sum();
            let height = nodes[i]
                .children
                .iter()
                .map(|&c| nodes[c].height)
                .max()
                .unwrap_or(0);
            nodes[i].x = sum / count;
            nodes[i].height = height + 1;
        }

        let first_leaf = nodes.iter().position(|n| n.children.is_empty()).unwrap_or(0);
        let last_leaf = nodes.iter().rposition(|n| n.children.is_empty()).unwrap_or(0);
        let x0 = nodes[first_leaf].x - self.separation(first_leaf, last_leaf, &nodes) / 2.0;
        let x1 = nodes[last_leaf].x + self.separation(last_leaf, first_leaf, &nodes) / 2.0;
        let span = x1 - x0;
        let root_height = nodes[0].height;

        nodes
            .iter()
            .map(|node| {
                let level = if root_height > 0 {
                    node.height as f32 / root_height as f32
                } else {
                    1.0
                };
                PlacedNode {
                    entity: node.entity,
                    parent: node.parent.map(|p| nodes[p].entity),
                    x: (node.x - x0) / span * size[0],
                    y: (1.0 - level) * size[1],
                    depth: node.depth,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BirthDeathRecord;

    fn store(ids: &[&str], relations: &[&[&str]]) -> LineageStore {
        let records: Vec<_> = ids
            .iter()
            .map(|id| BirthDeathRecord {
                id: id.to_string(),
                birth: 0,
                death: None,
            })
            .collect();
        let mut store = LineageStore::from_records(&records).unwrap();
        let rows: Vec<Vec<&str>> = relations.iter().map(|r| r.to_vec()).collect();
        store.wire_relations(&rows).unwrap();
        store
    }

    fn by_id<'a>(store: &LineageStore, placed: &'a [PlacedNode], id: &str) -> &'a PlacedNode {
        let entity = store.lookup(id).unwrap();
        placed.iter().find(|p| p.entity == entity).unwrap()
    }

    #[test]
    fn test_single_node_centred() {
        let s = store(&["A"], &[]);
        let placed = ClusterLayout::default().layout(&s, s.lookup("A").unwrap(), [100.0, 300.0]);
        assert_eq!(placed.len(), 1);
        assert!((placed[0].x - 50.0).abs() < 0.01);
        assert_eq!(placed[0].y, 0.0);
        assert_eq!(placed[0].depth, 0);
        assert_eq!(placed[0].parent, None);
    }

    #[test]
    fn test_parent_centred_over_children() {
        let s = store(&["A", "B", "C"], &[&["1", "C", "A", "B"]]);
        let c = s.lookup("C").unwrap();
        let placed = ClusterLayout::default().layout(&s, c, [100.0, 200.0]);
        assert_eq!(placed.len(), 3);

        let a = by_id(&s, &placed, "A");
        let b = by_id(&s, &placed, "B");
        let root = by_id(&s, &placed, "C");
        assert!((root.x - (a.x + b.x) / 2.0).abs() < 0.01);
        assert_eq!(a.depth, 1);
        assert_eq!(b.depth, 1);
        assert_eq!(root.depth, 0);
        assert_eq!(a.parent, Some(c));

        // Leaves at the far end of the extent axis, root at 0.
        assert!((a.y - 200.0).abs() < 0.01);
        assert!(root.y.abs() < 0.01);

        // Two siblings: x0 = -0.5, x1 = 1.5
        assert!((a.x - 25.0).abs() < 0.01);
        assert!((b.x - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_cousins_closer_than_siblings() {
        // R -> P, Q ; P -> a, b ; Q -> c, d
        let s = store(
            &["R", "P", "Q", "a", "b", "c", "d"],
            &[&["1", "R", "P", "Q"], &["2", "P", "a", "b"], &["3", "Q", "c", "d"]],
        );
        let placed = ClusterLayout::default().layout(&s, s.lookup("R").unwrap(), [1.0, 1.0]);
        let a = by_id(&s, &placed, "a").x;
        let b = by_id(&s, &placed, "b").x;
        let c = by_id(&s, &placed, "c").x;
        let sibling_gap = b - a;
        let cousin_gap = c - b;
        assert!((cousin_gap / sibling_gap - 0.7).abs() < 0.01);
    }

    #[test]
    fn test_preorder_output() {
        let s = store(&["A", "B", "C", "D"], &[&["1", "A", "B", "D"], &["2", "B", "C"]]);
        let placed = ClusterLayout::default().layout(&s, s.lookup("A").unwrap(), [1.0, 1.0]);
        let ids: Vec<_> = placed.iter().map(|p| s.entity(p.entity).id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        let depths: Vec<_> = placed.iter().map(|p| p.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_collapsed_branch_is_leaf() {
        let mut s = store(&["A", "B", "C"], &[&["1", "A", "B"], &["2", "B", "C"]]);
        s.collapse(s.lookup("B").unwrap());
        let placed = ClusterLayout::default().layout(&s, s.lookup("A").unwrap(), [1.0, 1.0]);
        assert_eq!(placed.len(), 2);
    }

    #[test]
    fn test_layout_rooted_below_tree_root() {
        let s = store(&["A", "B", "C"], &[&["1", "A", "B"], &["2", "B", "C"]]);
        let b = s.lookup("B").unwrap();
        let placed = ClusterLayout::default().layout(&s, b, [1.0, 1.0]);
        assert_eq!(placed[0].entity, b);
        assert_eq!(placed[0].depth, 0);
        assert_eq!(placed[0].parent, None);
    }
}
