//! Depth-bounded subtree selection around a focal entity.
//!
//! A bounded view walks up to `d` parent links from the focal entity
//! (stopping at a natural root), lays out the subtree below the ancestor it
//! reached, and cuts everything deeper than `d + steps_walked`. Entities on
//! the cut level are collapsed rather than removed, so they stay selectable
//! and a later view restores them exactly.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::{HierarchyLayout, PlacedNode};
use crate::error::{LineageError, Result};
use crate::graph::{EntityId, Forest, LineageStore};

/// Maximum tree distance shown around the focal entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBound {
    /// `*`: the whole tree containing the focal entity.
    Unbounded,
    Bounded(u32),
}

impl FromStr for DepthBound {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed == "*" {
            return Ok(DepthBound::Unbounded);
        }
        trimmed
            .parse::<u32>()
            .map(DepthBound::Bounded)
            .map_err(|_| LineageError::InvalidDepth(s.to_string()))
    }
}

impl fmt::Display for DepthBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthBound::Unbounded => write!(f, "*"),
            DepthBound::Bounded(d) => write!(f, "{d}"),
        }
    }
}

/// Which entity to centre the view on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocalSelector {
    /// `*`: the virtual root, showing every tree.
    WholeForest,
    Entity(String),
}

impl FocalSelector {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "*" => FocalSelector::WholeForest,
            id => FocalSelector::Entity(id.to_string()),
        }
    }

    /// The id as typed, `*` for the whole forest.
    pub fn label(&self) -> &str {
        match self {
            FocalSelector::WholeForest => "*",
            FocalSelector::Entity(id) => id,
        }
    }
}

/// Result of a subtree selection.
#[derive(Debug, Clone)]
pub struct Selection {
    pub focal: EntityId,
    /// Root of the displayed subtree.
    pub root: EntityId,
    /// Depth of the cut relative to `root`; `None` when unbounded.
    pub max_depth: Option<u32>,
    /// Selected nodes with depths relative to `root`.
    pub nodes: Vec<PlacedNode>,
}

/// Select the subtree to display for `focal` under `bound`.
///
/// Every collapsed branch in the store is restored first, so successive
/// selections never compound. Unknown focal ids yield `EntityNotFound`
/// without touching the store.
pub fn select_subtree<L: HierarchyLayout + ?Sized>(
    store: &mut LineageStore,
    forest: &Forest,
    layout: &L,
    focal: &FocalSelector,
    bound: DepthBound,
) -> Result<Selection> {
    let not_found = || LineageError::EntityNotFound(focal.label().to_string());

    let (tree_root, focal_entity) = match focal {
        FocalSelector::WholeForest => {
            let tree = forest.whole_forest().ok_or_else(not_found)?;
            (tree.root, tree.root)
        }
        FocalSelector::Entity(id) => {
            let (index, entity) = forest.locate(store, id).ok_or_else(not_found)?;
            let tree = forest.tree(index).ok_or_else(not_found)?;
            (tree.root, entity)
        }
    };

    let restored = store.restore_all();
    if restored > 0 {
        debug!(restored, "restored collapsed branches");
    }

    let DepthBound::Bounded(d) = bound else {
        let nodes = layout.layout(store, tree_root, [1.0, 1.0]);
        return Ok(Selection {
            focal: focal_entity,
            root: tree_root,
            max_depth: None,
            nodes,
        });
    };

    let (root, max_depth) = if store.is_virtual(focal_entity) {
        // The virtual root's own level does not count against the bound.
        (focal_entity, d.saturating_add(1))
    } else {
        let mut ancestor = focal_entity;
        let mut steps = 0u32;
        while steps < d {
            match store.real_parent(ancestor) {
                Some(parent) => {
                    ancestor = parent;
                    steps += 1;
                }
                None => break,
            }
        }
        (ancestor, d.saturating_add(steps))
    };

    let mut nodes = layout.layout(store, root, [1.0, 1.0]);
    apply_depth_cut(store, &mut nodes, max_depth);

    debug!(
        focal = %store.entity(focal_entity).id,
        root = %store.entity(root).id,
        max_depth,
        nodes = nodes.len(),
        "subtree selected"
    );

    Ok(Selection {
        focal: focal_entity,
        root,
        max_depth: Some(max_depth),
        nodes,
    })
}

/// Cut a laid-out node list at `max_depth`.
///
/// Sorts by depth (stable), drops nodes deeper than `max_depth`, and
/// collapses the children of nodes exactly at `max_depth`. Returns the
/// number of nodes dropped.
pub fn apply_depth_cut(
    store: &mut LineageStore,
    nodes: &mut Vec<PlacedNode>,
    max_depth: u32,
) -> usize {
    nodes.sort_by_key(|n| n.depth);
    let keep = nodes.partition_point(|n| n.depth <= max_depth);
    let dropped = nodes.len() - keep;
    nodes.truncate(keep);

    for node in nodes.iter().rev().take_while(|n| n.depth == max_depth) {
        store.collapse(node.entity);
    }
    dropped
}
