//! Birth/death table rows.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{LineageError, Result};

/// One row of the birth/death table: `id, birthFrame, deathFrame`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthDeathRecord {
    pub id: String,
    pub birth: u32,
    /// Absent when the death cell is empty, `null`, or missing.
    pub death: Option<u32>,
}

fn parse_frame(cell: &str) -> Option<u32> {
    cell.trim().parse::<u32>().ok()
}

fn is_absent(cell: Option<&str>) -> bool {
    match cell.map(str::trim) {
        None => true,
        Some(c) => c.is_empty() || c.eq_ignore_ascii_case("null"),
    }
}

impl BirthDeathRecord {
    /// Parse tokenized rows.
    ///
    /// Blank rows are skipped. A first row whose birth cell is not a number
    /// is treated as a header. Ids must be unique and `birth <= death`.
    pub fn parse_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Vec<Self>> {
        let mut records = Vec::with_capacity(rows.len());
        let mut seen = HashSet::with_capacity(rows.len());

        for (row_index, row) in rows.iter().enumerate() {
            let cells: Vec<&str> = row.iter().map(|c| c.as_ref()).collect();
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }

            let id = cells[0].trim();
            let birth_cell = cells.get(1).copied().unwrap_or("");

            let Some(birth) = parse_frame(birth_cell) else {
                if row_index == 0 {
                    debug!(header = ?cells, "skipping birth/death header row");
                    continue;
                }
                return Err(LineageError::InvalidRecord {
                    row: row_index,
                    reason: format!(
                        "birth frame '{}' is not a non-negative integer",
                        birth_cell.trim()
                    ),
                });
            };

            if id.is_empty() {
                return Err(LineageError::InvalidRecord {
                    row: row_index,
                    reason: "missing entity id".into(),
                });
            }

            let death_cell = cells.get(2).copied();
            let death = if is_absent(death_cell) {
                None
            } else {
                let cell = death_cell.unwrap_or("").trim();
                let frame = parse_frame(cell).ok_or_else(|| LineageError::InvalidRecord {
                    row: row_index,
                    reason: format!("death frame '{cell}' is not a non-negative integer"),
                })?;
                if frame < birth {
                    return Err(LineageError::InvalidRecord {
                        row: row_index,
                        reason: format!("death frame {frame} precedes birth frame {birth}"),
                    });
                }
                Some(frame)
            };

            if !seen.insert(id.to_string()) {
                return Err(LineageError::InvalidRecord {
                    row: row_index,
                    reason: format!("duplicate entity id '{id}'"),
                });
            }

            records.push(Self {
                id: id.to_string(),
                birth,
                death,
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_basic_rows() {
        let records =
            BirthDeathRecord::parse_rows(&rows(&[&["A", "0", "5"], &["B", "3", ""], &["C", "9"]]))
                .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].death, Some(5));
        assert_eq!(records[1].death, None);
        assert_eq!(records[2].death, None);
    }

    #[test]
    fn test_header_row_skipped() {
        let records = BirthDeathRecord::parse_rows(&rows(&[
            &["Cell ID", "Birth Frame", "Death Frame"],
            &["1", "1", "4"],
        ]))
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
    }

    #[test]
    fn test_non_numeric_birth_after_first_row_rejected() {
        let err = BirthDeathRecord::parse_rows(&rows(&[&["1", "1", "4"], &["2", "x", "4"]]))
            .unwrap_err();
        assert!(matches!(err, LineageError::InvalidRecord { row: 1, .. }));
    }

    #[test]
    fn test_death_before_birth_rejected() {
        let err = BirthDeathRecord::parse_rows(&rows(&[&["1", "8", "4"]])).unwrap_err();
        assert!(matches!(err, LineageError::InvalidRecord { row: 0, .. }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = BirthDeathRecord::parse_rows(&rows(&[&["1", "0", "4"], &["1", "2", "4"]]))
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let records =
            BirthDeathRecord::parse_rows(&rows(&[&["", ""], &["A", "0", "null"], &[]])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].death, None);
    }
}
