//! R-tree based spatial index using the rstar crate.
//!
//! Points are keyed by their slot in the caller's node list. The index is a
//! snapshot: moving a node afterwards does not update the tree, so callers
//! that relax positions read live coordinates from their own arrays and use
//! the index only to find candidates.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// A point in the spatial index with its slot in the node list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPoint {
    pub slot: usize,
    pub x: f32,
    pub y: f32,
}

impl SlotPoint {
    pub fn new(slot: usize, x: f32, y: f32) -> Self {
        Self { slot, x, y }
    }
}

impl RTreeObject for SlotPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for SlotPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        (self.x - point[0]).abs() < f32::EPSILON && (self.y - point[1]).abs() < f32::EPSILON
    }
}

/// Spatial index over laid-out nodes.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SlotPoint>,
}

impl SpatialIndex {
    /// Bulk-load an index from parallel coordinate slices.
    pub fn from_positions(xs: &[f32], ys: &[f32]) -> Self {
        let points: Vec<_> = xs
            .iter()
            .zip(ys)
            .enumerate()
            .map(|(slot, (&x, &y))| SlotPoint::new(slot, x, y))
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Nearest slot within `max_distance` of a point.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<usize> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.slot)
    }

    /// Slots whose indexed position lies inside the rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<usize> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.slot)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_within() {
        let index = SpatialIndex::from_positions(&[0.0, 10.0], &[0.0, 10.0]);

        assert_eq!(index.nearest_within(0.0, 0.0, 5.0), Some(0));
        assert_eq!(index.nearest_within(5.0, 5.0, 1.0), None);
        // Slot 0 is ~7.07 from (5, 5)
        assert!(index.nearest_within(5.0, 5.0, 8.0).is_some());
    }

    #[test]
    fn test_in_rect() {
        let index = SpatialIndex::from_positions(&[0.0, 5.0, 10.0], &[0.0, 5.0, 10.0]);

        let mut in_rect = index.in_rect(-1.0, -1.0, 6.0, 6.0);
        in_rect.sort();
        assert_eq!(in_rect, vec![0, 1]);
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::from_positions(&[], &[]);
        assert!(index.is_empty());
        assert_eq!(index.nearest_within(0.0, 0.0, 100.0), None);
        assert!(index.in_rect(-1.0, -1.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_len_matches_input() {
        let index = SpatialIndex::from_positions(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(index.len(), 3);
        assert!(SpatialIndex::default().is_empty());
    }
}
