//! Error types for lineage ingestion and view construction.

use thiserror::Error;

/// Errors raised while loading lineage tables or building a view.
///
/// Ingest errors (`UnknownEntity`, `ConflictingParent`, `CyclicRelation`,
/// `InvalidRecord`) reject a whole table; the previously loaded data stays
/// active. View errors (`InvalidDepth`, `EntityNotFound`) leave the last
/// rendered view in place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineageError {
    /// A relation row references an id missing from the birth/death table.
    #[error("relation row {row} references unknown entity '{id}'")]
    UnknownEntity { id: String, row: usize },

    /// A child was listed under a second parent.
    #[error("entity '{child}' already has parent '{existing}', cannot attach it to '{attempted}'")]
    ConflictingParent {
        child: String,
        existing: String,
        attempted: String,
    },

    /// Attaching the child would make it its own ancestor.
    #[error("relation would make entity '{id}' its own ancestor")]
    CyclicRelation { id: String },

    /// A birth/death row could not be interpreted.
    #[error("birth/death row {row} is invalid: {reason}")]
    InvalidRecord { row: usize, reason: String },

    /// Depth input is neither a non-negative integer nor `*`.
    #[error("depth must be a non-negative integer or '*', got '{0}'")]
    InvalidDepth(String),

    /// The focal id does not appear in any tree.
    #[error("entity '{0}' not found in the lineage forest")]
    EntityNotFound(String),

    /// Configuration values out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LineageError {
    /// Whether this error concerns a view request only, so the previous view
    /// should remain on screen.
    pub fn is_view_error(&self) -> bool {
        matches!(
            self,
            LineageError::InvalidDepth(_) | LineageError::EntityNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LineageError>;
