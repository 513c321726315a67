//! Relation records and their semantics.
//!
//! A relation row states that one or more entities split from, or merged
//! into, a resulting entity:
//!
//! ```text
//! eventId, resultId, otherId_1, ..., otherId_k
//! ```
//!
//! Rows are ragged; empty and `null` cells are ignored. In the tree the
//! result entity is the parent and the listed entities are its children,
//! for both relation kinds. The kind only decides which side is earlier in
//! time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relation semantics of a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    /// Parent divides into children: root-to-leaf runs forward in time.
    Division,
    /// Children merge into the parent: leaf-to-root runs forward in time.
    Fusion,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Division => write!(f, "division"),
            RelationKind::Fusion => write!(f, "fusion"),
        }
    }
}

/// Cell values treated as absent.
fn is_blank(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.eq_ignore_ascii_case("null")
}

/// One tokenized relation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow<'a> {
    /// Event identifier (informational only).
    pub event: &'a str,
    /// Resulting entity id (parent in the tree).
    pub parent: &'a str,
    /// Non-blank entity ids attached under `parent`, in row order.
    pub children: Vec<&'a str>,
}

impl<'a> RelationRow<'a> {
    /// Interpret a tokenized row. Returns `None` for rows with no parent and
    /// no children (blank lines).
    pub fn parse<S: AsRef<str>>(cells: &'a [S]) -> Option<Self> {
        let event = cells.first().map(|c| c.as_ref().trim()).unwrap_or("");
        let parent = cells.get(1).map(|c| c.as_ref().trim()).unwrap_or("");
        let children: Vec<&'a str> = cells
            .iter()
            .skip(2)
            .map(|c| c.as_ref())
            .filter(|c| !is_blank(c))
            .map(str::trim)
            .collect();

        if is_blank(parent) && children.is_empty() {
            return None;
        }

        Some(Self {
            event,
            parent,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ragged_row() {
        let cells = ["1", "C", "A", "", "B", "null"];
        let row = RelationRow::parse(&cells).unwrap();
        assert_eq!(row.event, "1");
        assert_eq!(row.parent, "C");
        assert_eq!(row.children, vec!["A", "B"]);
    }

    #[test]
    fn test_parse_trims_cells() {
        let cells = vec![" 7".to_string(), " 12 ".to_string(), " 3".to_string()];
        let row = RelationRow::parse(&cells).unwrap();
        assert_eq!(row.parent, "12");
        assert_eq!(row.children, vec!["3"]);
    }

    #[test]
    fn test_blank_row_skipped() {
        let cells = ["", "", "NULL"];
        assert!(RelationRow::parse(&cells).is_none());
        let empty: [&str; 0] = [];
        assert!(RelationRow::parse(&empty).is_none());
    }

    #[test]
    fn test_row_with_only_parent() {
        let cells = ["3", "X"];
        let row = RelationRow::parse(&cells).unwrap();
        assert!(row.children.is_empty());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RelationKind::Division.to_string(), "division");
        assert_eq!(RelationKind::Fusion.to_string(), "fusion");
    }
}
