//! Lineage Mapper - WASM Module
//!
//! Builds cell lineage forests from birth/death and relation tables and lays
//! out a focal subtree as a dendrogram against a time axis. It is compiled to
//! WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Entity arena, relation wiring and the forest index
//! - `layout`: Cluster dendrogram, depth-bounded selection, time-axis layout
//!   and collision relaxation
//! - `spatial`: R-tree spatial indexing for collision candidates and hit testing
//! - `session`: The context object owning loaded tables and the current view

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod session;
pub mod spatial;

use config::LineageConfig;
use error::LineageError;
use graph::RelationKind;
use layout::LineageView;
use session::{LineageSession, ViewRequest};

/// Initialize the WASM module: panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    logging::init(level);
}

/// Result of a view request as seen by JavaScript.
///
/// A missing focal id or a bad depth is an expected outcome of user input,
/// so it is reported as a status rather than thrown.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ViewOutcome<'a> {
    Rendered { view: &'a LineageView },
    NotFound { focal: String },
    Invalid { message: String },
}

impl<'a> ViewOutcome<'a> {
    /// Classify a view result. Errors other than view errors pass through.
    pub fn from_result(result: error::Result<&'a LineageView>) -> error::Result<Self> {
        match result {
            Ok(view) => Ok(ViewOutcome::Rendered { view }),
            Err(LineageError::EntityNotFound(focal)) => Ok(ViewOutcome::NotFound { focal }),
            Err(err @ LineageError::InvalidDepth(_)) => Ok(ViewOutcome::Invalid {
                message: err.to_string(),
            }),
            Err(err) => Err(err),
        }
    }
}

fn outcome_to_js(result: error::Result<&LineageView>) -> Result<JsValue, JsError> {
    let outcome = ViewOutcome::from_result(result)?;
    Ok(serde_wasm_bindgen::to_value(&outcome)?)
}

fn rows_from_js(rows: JsValue) -> Result<Vec<Vec<String>>, JsError> {
    Ok(serde_wasm_bindgen::from_value(rows)?)
}

/// Main entry point for the lineage viewer.
///
/// This struct wraps a [`LineageSession`] and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct LineageMapperWasm {
    session: LineageSession,
}

#[wasm_bindgen]
impl LineageMapperWasm {
    /// Create a viewer. `config` may be `undefined` or a partial
    /// camelCase configuration object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<LineageMapperWasm, JsError> {
        let config: LineageConfig = if config.is_undefined() || config.is_null() {
            LineageConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            session: LineageSession::new(config)?,
        })
    }

    // =========================================================================
    // Ingest
    // =========================================================================

    /// Load the birth/death table as an array of string rows.
    ///
    /// Returns the number of entities loaded.
    #[wasm_bindgen(js_name = loadBirthDeath)]
    pub fn load_birth_death(&mut self, rows: JsValue) -> Result<u32, JsError> {
        let rows = rows_from_js(rows)?;
        Ok(self.session.load_birth_death(&rows)? as u32)
    }

    /// Load a relation table. `fusion` selects fusion semantics, otherwise
    /// the rows are divisions.
    ///
    /// Returns the number of parent/child links.
    #[wasm_bindgen(js_name = loadRelations)]
    pub fn load_relations(&mut self, rows: JsValue, fusion: bool) -> Result<u32, JsError> {
        let rows = rows_from_js(rows)?;
        let kind = if fusion {
            RelationKind::Fusion
        } else {
            RelationKind::Division
        };
        Ok(self.session.load_relations(&rows, kind)? as u32)
    }

    /// Drop all tables and the current view.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Queue a view for typed input. Call `tick` with the same clock.
    #[wasm_bindgen(js_name = requestView)]
    pub fn request_view(&mut self, focal: &str, depth: &str, now: f64) {
        self.session.request_view(ViewRequest::new(focal, depth), now);
    }

    /// Run a due view request. Returns `undefined` when nothing ran,
    /// otherwise a `{ status, ... }` outcome.
    pub fn tick(&mut self, now: f64) -> Result<JsValue, JsError> {
        match self.session.poll(now) {
            Some(result) => outcome_to_js(result),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Show a view immediately, cancelling any queued request.
    #[wasm_bindgen(js_name = showNow)]
    pub fn show_now(&mut self, focal: &str, depth: &str) -> Result<JsValue, JsError> {
        outcome_to_js(self.session.show_now(focal, depth))
    }

    #[wasm_bindgen(js_name = hasPendingRequest)]
    pub fn has_pending_request(&self) -> bool {
        self.session.has_pending_request()
    }

    /// The last rendered view, or `undefined`.
    #[wasm_bindgen(js_name = currentView)]
    pub fn current_view(&self) -> Result<JsValue, JsError> {
        match self.session.view() {
            Some(view) => Ok(serde_wasm_bindgen::to_value(view)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = clearView)]
    pub fn clear_view(&mut self) {
        self.session.clear_view();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Birth, death and lineage neighbours of an entity, or `undefined`.
    #[wasm_bindgen(js_name = entityInfo)]
    pub fn entity_info(&self, id: &str) -> Result<JsValue, JsError> {
        match self.session.entity_info(id) {
            Some(info) => Ok(serde_wasm_bindgen::to_value(&info)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Id of the rendered node nearest to a screen point.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        self.session
            .view()?
            .node_at(x, y, max_distance)
            .map(|node| node.id.clone())
    }

    /// Screen positions of the rendered nodes as [x0, y0, x1, y1, ...].
    #[wasm_bindgen(js_name = screenPositions)]
    pub fn screen_positions(&self) -> Float32Array {
        let positions = self
            .session
            .view()
            .map(LineageView::screen_positions)
            .unwrap_or_default();
        Float32Array::from(&positions[..])
    }

    /// Zoom factor that fits the rendered canvas into a viewport.
    #[wasm_bindgen(js_name = fitScale)]
    pub fn fit_scale(&self, viewport_width: f32, viewport_height: f32) -> f32 {
        self.session
            .view()
            .map_or(1.0, |view| view.fit_scale(viewport_width, viewport_height))
    }

    #[wasm_bindgen(js_name = cellCount)]
    pub fn cell_count(&self) -> u32 {
        self.session.cell_count() as u32
    }

    /// Number of natural trees in the forest.
    #[wasm_bindgen(js_name = treeCount)]
    pub fn tree_count(&self) -> u32 {
        self.session.tree_count() as u32
    }

    /// `"division"` or `"fusion"`.
    #[wasm_bindgen(js_name = relationKind)]
    pub fn relation_kind(&self) -> String {
        self.session.relation_kind().to_string()
    }
}
