//! Layout of lineage trees against a time axis.
//!
//! Structural placement is delegated to a [`HierarchyLayout`] (the default is
//! the [`ClusterLayout`] dendrogram). The timeline engine then remaps the
//! depth axis to birth frames and relaxes overlapping nodes.

pub mod cluster;
pub mod collide;
pub mod select;
pub mod timeline;

pub use cluster::ClusterLayout;
pub use collide::resolve_collisions;
pub use select::{DepthBound, FocalSelector, Selection, apply_depth_cut, select_subtree};
pub use timeline::{
    Canvas, LifetimeSegment, LineageView, TimeAxis, Timeline, ViewLink, ViewNode, canvas_size,
};

use crate::graph::{EntityId, LineageStore};

/// A node placed by a hierarchy layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode {
    pub entity: EntityId,
    /// Parent within this layout; `None` for the layout root.
    pub parent: Option<EntityId>,
    /// Structural position along the breadth axis.
    pub x: f32,
    /// Hierarchical position along the extent axis.
    pub y: f32,
    /// Distance from the layout root (root = 0).
    pub depth: u32,
}

/// Hierarchical layout capability.
///
/// Implementations traverse the displayed children of `root` (collapsed
/// branches are leaves) and return every reached node in pre-order, with
/// `x` in `[0, size[0]]` and `y` in `[0, size[1]]`.
pub trait HierarchyLayout {
    fn layout(&self, store: &LineageStore, root: EntityId, size: [f32; 2]) -> Vec<PlacedNode>;
}

impl<T: HierarchyLayout + ?Sized> HierarchyLayout for &T {
    fn layout(&self, store: &LineageStore, root: EntityId, size: [f32; 2]) -> Vec<PlacedNode> {
        (**self).layout(store, root, size)
    }
}
