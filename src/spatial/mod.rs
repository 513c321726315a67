//! Spatial indexing for collision candidates and hit testing.
//!
//! This module provides an R-tree based spatial index for nearest-neighbor
//! and range queries on laid-out lineage nodes.

mod rtree;

pub use rtree::SpatialIndex;
