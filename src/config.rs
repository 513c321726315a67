//! Configuration for lineage ingestion and layout.
//!
//! All structs deserialize from a camelCase JS object with every field
//! optional, so `new LineageMapperWasm({ timeline: { nodeRadius: 8 } })`
//! overrides a single value and keeps the rest at their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{LineageError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineageConfig {
    /// Synthesize a virtual root joining all natural roots (enables `*`).
    pub virtual_root: bool,
    /// Quiet period before a requested view is rebuilt, in milliseconds.
    pub debounce_ms: f64,
    /// Time axis and canvas sizing.
    pub timeline: TimelineConfig,
    /// Dendrogram spacing.
    pub cluster: ClusterConfig,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            virtual_root: true,
            debounce_ms: 1000.0,
            timeline: TimelineConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl LineageConfig {
    /// Reject values that would make the layout degenerate.
    pub fn validate(&self) -> Result<()> {
        if !(self.debounce_ms >= 0.0) {
            return Err(LineageError::Config(format!(
                "debounceMs must be >= 0, got {}",
                self.debounce_ms
            )));
        }
        self.timeline.validate()?;
        self.cluster.validate()
    }
}

/// Canvas sizing and time-axis mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    /// Width of a birth-frame bucket used to measure density (default: 20).
    pub bucket_width: u32,
    /// Minimum canvas height (default: 500).
    pub min_canvas: f32,
    /// Height reserved per node of the densest bucket (default: 60).
    pub row_height: f32,
    /// Canvas width as a multiple of its height (default: 1.5).
    pub aspect_ratio: f32,
    /// Display radius of every node (default: 16).
    pub node_radius: f32,
    /// Constant added to the computed time scale (default: 4).
    pub time_padding: f32,
    /// First frame of the time axis (default: 0).
    pub start_frame: u32,
    /// Lower bound for the axis end frame (default: 10).
    pub min_end_frame: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            bucket_width: 20,
            min_canvas: 500.0,
            row_height: 60.0,
            aspect_ratio: 1.5,
            node_radius: 16.0,
            time_padding: 4.0,
            start_frame: 0,
            min_end_frame: 10,
        }
    }
}

impl TimelineConfig {
    fn validate(&self) -> Result<()> {
        if self.bucket_width == 0 {
            return Err(LineageError::Config("bucketWidth must be positive".into()));
        }
        if !(self.min_canvas > 0.0) || !(self.row_height > 0.0) || !(self.aspect_ratio > 0.0) {
            return Err(LineageError::Config(
                "minCanvas, rowHeight and aspectRatio must be positive".into(),
            ));
        }
        if !(self.node_radius >= 0.0) || !(self.time_padding >= 0.0) {
            return Err(LineageError::Config(
                "nodeRadius and timePadding must be >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Separation rule for the dendrogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Gap between adjacent leaves sharing a parent (default: 1.0).
    pub sibling_separation: f32,
    /// Gap between adjacent leaves with different parents (default: 0.7).
    pub cousin_separation: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            sibling_separation: 1.0,
            cousin_separation: 0.7,
        }
    }
}

impl ClusterConfig {
    fn validate(&self) -> Result<()> {
        if !(self.sibling_separation > 0.0) || !(self.cousin_separation > 0.0) {
            return Err(LineageError::Config("separations must be positive".into()));
        }
        Ok(())
    }
}
