//! Time-axis layout of a selected subtree.
//!
//! Takes a [`Selection`] and turns it into a render-ready [`LineageView`]:
//!
//! 1. **Canvas:** size the canvas from the densest birth-frame bucket.
//! 2. **Structure:** re-run the hierarchy layout at canvas size and re-apply
//!    the depth cut.
//! 3. **Time:** replace the hierarchical coordinate with the birth frame
//!    scaled by the time scale.
//! 4. **Collisions:** relax overlapping nodes.
//! 5. **Links:** elbow polylines between parent and child, plus a lifetime
//!    segment for boundary entities.
//!
//! Layout space uses `x` for the structural coordinate and `y` for time.
//! Screen space swaps them so time runs left to right.

use std::collections::HashMap;

use serde::Serialize;

use super::collide::resolve_collisions;
use super::select::{Selection, apply_depth_cut};
use super::{HierarchyLayout, PlacedNode};
use crate::config::TimelineConfig;
use crate::graph::{EntityId, LineageStore, RelationKind};
use crate::spatial::SpatialIndex;

/// Drawing area in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    /// Canvas for a given occupancy of the densest birth bucket.
    pub fn for_density(max_bucket: usize, config: &TimelineConfig) -> Self {
        let height = (max_bucket.max(1) as f32 * config.row_height).max(config.min_canvas);
        Self {
            width: height * config.aspect_ratio,
            height,
        }
    }
}

/// Size the canvas from birth frames: the densest `bucket_width` window
/// decides the height, never below `min_canvas`.
pub fn canvas_size<I>(births: I, config: &TimelineConfig) -> Canvas
where
    I: IntoIterator<Item = u32>,
{
    let bucket_width = config.bucket_width.max(1);
    let mut buckets: HashMap<u32, usize> = HashMap::new();
    for birth in births {
        *buckets.entry(birth / bucket_width).or_default() += 1;
    }
    let max_bucket = buckets.values().copied().max().unwrap_or(1);
    Canvas::for_density(max_bucket, config)
}

/// Mapping from frames to the time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAxis {
    pub start_frame: u32,
    pub end_frame: u32,
    /// Screen units per frame.
    pub time_scale: f32,
    /// Time coordinate of `end_frame`.
    pub range_end: f32,
}

impl TimeAxis {
    pub fn new(start_frame: u32, end_frame: u32, width: f32, padding: f32) -> Self {
        let span = end_frame.saturating_sub(start_frame).max(1);
        let time_scale = padding + (width / span as f32).floor();
        Self {
            start_frame,
            end_frame,
            time_scale,
            range_end: end_frame.saturating_sub(start_frame) as f32 * time_scale,
        }
    }

    /// Time coordinate of a frame.
    #[inline]
    pub fn position(&self, frame: u32) -> f32 {
        (frame as f32 - self.start_frame as f32) * self.time_scale
    }
}

/// A rendered entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    pub id: String,
    pub birth: u32,
    pub death: Option<u32>,
    /// Distance from the displayed root; natural roots are 0 in a whole-forest view.
    pub depth: u32,
    /// Structural coordinate (screen y).
    pub x: f32,
    /// Time coordinate (screen x).
    pub y: f32,
    pub radius: f32,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub pruned_children: Vec<String>,
    pub focal: bool,
}

impl ViewNode {
    /// Position in screen space.
    #[inline]
    pub fn screen(&self) -> [f32; 2] {
        [self.y, self.x]
    }
}

/// An elbow link between a parent and a child, in screen space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewLink {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub points: [[f32; 2]; 3],
}

impl ViewLink {
    fn elbow(source: &ViewNode, target: &ViewNode, kind: RelationKind) -> Self {
        let [sx, sy] = source.screen();
        let [tx, ty] = target.screen();
        let corner = match kind {
            RelationKind::Division => [tx, sy],
            RelationKind::Fusion => [sx, ty],
        };
        Self {
            source: source.id.clone(),
            target: target.id.clone(),
            kind,
            points: [[sx, sy], corner, [tx, ty]],
        }
    }
}

/// Horizontal segment from birth to death, in screen space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeSegment {
    pub id: String,
    pub from: [f32; 2],
    pub to: [f32; 2],
}

/// Everything the renderer needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageView {
    /// Focal id as requested (`*` for the whole forest).
    pub focal: String,
    /// Id of the displayed root; `None` when the virtual root is on top.
    pub root_id: Option<String>,
    pub kind: RelationKind,
    pub canvas: Canvas,
    pub axis: TimeAxis,
    pub nodes: Vec<ViewNode>,
    pub links: Vec<ViewLink>,
    pub lifetimes: Vec<LifetimeSegment>,
}

impl LineageView {
    pub fn node(&self, id: &str) -> Option<&ViewNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Zoom factor for a viewport: 1 when the canvas fits, otherwise the
    /// larger of the two axis ratios.
    pub fn fit_scale(&self, viewport_width: f32, viewport_height: f32) -> f32 {
        let Canvas { width, height } = self.canvas;
        if width <= viewport_width && height <= viewport_height {
            1.0
        } else {
            (viewport_width / width).max(viewport_height / height)
        }
    }

    /// Flat screen positions `[x0, y0, x1, y1, ...]` in node order.
    pub fn screen_positions(&self) -> Vec<f32> {
        self.nodes.iter().flat_map(|n| n.screen()).collect()
    }

    /// Nearest node to a screen point within `max_distance`.
    pub fn node_at(&self, x: f32, y: f32, max_distance: f32) -> Option<&ViewNode> {
        let (xs, ys): (Vec<f32>, Vec<f32>) = self.nodes.iter().map(|n| (n.y, n.x)).unzip();
        let index = SpatialIndex::from_positions(&xs, &ys);
        index
            .nearest_within(x, y, max_distance)
            .map(|slot| &self.nodes[slot])
    }
}

/// The time-axis layout engine.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    config: TimelineConfig,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Axis for a store: from `start_frame` to the largest death frame,
    /// never shorter than `min_end_frame`.
    pub fn axis(&self, store: &LineageStore, canvas: Canvas) -> TimeAxis {
        let end_frame = store
            .max_death()
            .unwrap_or(0)
            .max(self.config.min_end_frame);
        TimeAxis::new(
            self.config.start_frame,
            end_frame,
            canvas.width,
            self.config.time_padding,
        )
    }

    /// Lay out `selection` against the time axis.
    pub fn compose<L: HierarchyLayout + ?Sized>(
        &self,
        store: &mut LineageStore,
        layout: &L,
        selection: &Selection,
        kind: RelationKind,
        focal: &str,
    ) -> LineageView {
        let canvas = canvas_size(
            selection
                .nodes
                .iter()
                .filter(|n| !store.is_virtual(n.entity))
                .map(|n| store.entity(n.entity).birth),
            &self.config,
        );

        let mut placed = layout.layout(store, selection.root, [canvas.height, canvas.width]);
        if let Some(max_depth) = selection.max_depth {
            apply_depth_cut(store, &mut placed, max_depth);
        }
        let axis = self.axis(store, canvas);

        let visible: Vec<PlacedNode> = placed
            .into_iter()
            .filter(|n| !store.is_virtual(n.entity))
            .collect();

        let mut xs: Vec<f32> = visible.iter().map(|n| n.x).collect();
        let mut ys: Vec<f32> = visible
            .iter()
            .map(|n| axis.position(store.entity(n.entity).birth))
            .collect();
        let radii = vec![self.config.node_radius; visible.len()];
        resolve_collisions(&mut xs, &mut ys, &radii);

        let depth_offset = u32::from(store.is_virtual(selection.root));
        let nodes: Vec<ViewNode> = visible
            .iter()
            .enumerate()
            .map(|(slot, placed)| {
                self.view_node(store, placed, xs[slot], ys[slot], depth_offset, selection.focal)
            })
            .collect();

        let slots: HashMap<EntityId, usize> = visible
            .iter()
            .enumerate()
            .map(|(slot, n)| (n.entity, slot))
            .collect();
        let links = visible
            .iter()
            .enumerate()
            .filter_map(|(slot, n)| {
                let parent = slots.get(&n.parent?)?;
                Some(ViewLink::elbow(&nodes[*parent], &nodes[slot], kind))
            })
            .collect();

        let lifetimes = visible
            .iter()
            .zip(&nodes)
            .filter(|(placed, _)| match kind {
                RelationKind::Division => store.entity(placed.entity).branch.displayed().is_empty(),
                RelationKind::Fusion => store.real_parent(placed.entity).is_none(),
            })
            .map(|(_, node)| LifetimeSegment {
                id: node.id.clone(),
                from: node.screen(),
                to: [axis.position(node.death.unwrap_or(axis.end_frame)), node.x],
            })
            .collect();

        LineageView {
            focal: focal.to_string(),
            root_id: (!store.is_virtual(selection.root))
                .then(|| store.entity(selection.root).id.clone()),
            kind,
            canvas,
            axis,
            nodes,
            links,
            lifetimes,
        }
    }

    fn view_node(
        &self,
        store: &LineageStore,
        placed: &PlacedNode,
        x: f32,
        y: f32,
        depth_offset: u32,
        focal: EntityId,
    ) -> ViewNode {
        let entity = store.entity(placed.entity);
        let ids = |list: &[EntityId]| -> Vec<String> {
            list.iter().map(|&c| store.entity(c).id.clone()).collect()
        };
        ViewNode {
            id: entity.id.clone(),
            birth: entity.birth,
            death: entity.death,
            depth: placed.depth.saturating_sub(depth_offset),
            x,
            y,
            radius: self.config.node_radius,
            parent: store
                .real_parent(placed.entity)
                .map(|p| store.entity(p).id.clone()),
            children: ids(entity.branch.displayed()),
            pruned_children: ids(entity.branch.pruned()),
            focal: placed.entity == focal,
        }
    }
}
