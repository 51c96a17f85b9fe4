//! Score store
//!
//! Stored results are rows of text cells keyed by a 5-character user id:
//!
//! ```text
//! | id    | date       | q1 | q2 | ... | qN | total |
//! | aB3x9 | 09-03-2024 | 14 | 7  | ... | 2  | 96    |
//! ```
//!
//! Backends only deal in rows; `StoreRecord` is the typed projection the
//! session works with.

mod identifier;
mod memory;
mod sheet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::SessionResult;

pub use identifier::{
    generate_unique, is_well_formed, next_identifier, random_identifier, validate_identifier,
    IdentifierProblem, IDENTIFIER_LEN, MAX_FALLBACK_PROBES, MAX_RANDOM_ATTEMPTS,
};
pub use memory::MemoryStore;
pub use sheet::SheetStore;

/// Date format of the date column
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Errors surfaced by store backends
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("no stored results for user id {0}")]
    NotFound(String),

    #[error("results for user id {0} are already stored")]
    Conflict(String),

    #[error("row for user id {identifier} is malformed: {reason}")]
    MalformedRow { identifier: String, reason: String },

    #[error("record for user id {record} cannot be written under user id {key}")]
    IdentifierMismatch { key: String, record: String },

    #[error("could not find a free user id after {attempts} attempts")]
    IdentifierSpaceExhausted { attempts: usize },

    #[error("score sheet error: {0}")]
    Database(#[from] redb::Error),

    #[error("score sheet encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("failed to open score sheet: {0}")]
    Io(#[from] std::io::Error),
}

/// One stored result, keyed by `identifier`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub identifier: String,
    pub date: NaiveDate,
    pub answers: Vec<u32>,
    pub total_score: u32,
}

impl StoreRecord {
    /// Project a completed session result into a full row
    pub fn from_result(identifier: impl Into<String>, result: &SessionResult) -> Self {
        Self {
            identifier: identifier.into(),
            date: result.date,
            answers: result.answers.clone(),
            total_score: result
                .total_score
                .unwrap_or_else(|| crate::scoring::total(&result.answers)),
        }
    }

    pub fn to_result(&self) -> SessionResult {
        SessionResult {
            date: self.date,
            answers: self.answers.clone(),
            total_score: Some(self.total_score),
        }
    }

    /// Cells in column order: id, date, answers..., total
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.answers.len() + 3);
        row.push(self.identifier.clone());
        row.push(self.date.format(DATE_FORMAT).to_string());
        row.extend(self.answers.iter().map(u32::to_string));
        row.push(self.total_score.to_string());
        row
    }

    /// Read a row back, checking only its shape
    pub fn from_row(row: &[String]) -> Result<Self, StoreError> {
        let identifier = row.first().cloned().unwrap_or_default();
        let malformed = |reason: String| StoreError::MalformedRow {
            identifier: identifier.clone(),
            reason,
        };

        if row.len() < 3 {
            return Err(malformed(format!("expected at least 3 cells, found {}", row.len())));
        }

        let date = NaiveDate::parse_from_str(row[1].trim(), DATE_FORMAT)
            .map_err(|e| malformed(format!("bad date {:?}: {}", row[1], e)))?;

        let last = row.len() - 1;
        let answers = row[2..last]
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                cell.trim()
                    .parse::<u32>()
                    .map_err(|_| malformed(format!("bad score {:?} in column {}", cell, i + 3)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_score = row[last]
            .trim()
            .parse::<u32>()
            .map_err(|_| malformed(format!("bad total {:?}", row[last])))?;

        Ok(Self {
            identifier,
            date,
            answers,
            total_score,
        })
    }
}

/// Record store keyed by user id.
///
/// `update` replaces the whole row; callers pass the complete record.
/// Every write to a missing (or, for `append`, existing) row fails
/// instead of silently doing nothing.
pub trait UserStore: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &str;

    /// Look up the row stored under exactly `identifier`
    fn find(&self, identifier: &str) -> Result<Option<StoreRecord>, StoreError>;

    /// Store a new row
    fn append(&self, record: &StoreRecord) -> Result<(), StoreError>;

    /// Overwrite the row stored under `identifier`
    fn update(&self, identifier: &str, record: &StoreRecord) -> Result<(), StoreError>;

    /// Remove the row stored under `identifier`
    fn delete(&self, identifier: &str) -> Result<(), StoreError>;

    fn contains(&self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.find(identifier)?.is_some())
    }
}

fn check_key(key: &str, record: &StoreRecord) -> Result<(), StoreError> {
    if key != record.identifier {
        return Err(StoreError::IdentifierMismatch {
            key: key.to_string(),
            record: record.identifier.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StoreRecord {
        StoreRecord {
            identifier: "aB3x9".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            answers: vec![14, 7, 0],
            total_score: 21,
        }
    }

    fn cells(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_row_layout() {
        assert_eq!(
            record().to_row(),
            cells(&["aB3x9", "09-03-2024", "14", "7", "0", "21"])
        );
    }

    #[test]
    fn test_from_row_reads_columns() {
        let parsed = StoreRecord::from_row(&cells(&["aB3x9", "09-03-2024", "14", "7", "0", "21"]))
            .unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn test_from_row_without_answers() {
        let parsed = StoreRecord::from_row(&cells(&["aB3x9", "09-03-2024", "0"])).unwrap();
        assert!(parsed.answers.is_empty());
        assert_eq!(parsed.total_score, 0);
    }

    #[test]
    fn test_from_row_shape_errors() {
        for row in [
            cells(&["aB3x9", "09-03-2024"]),
            cells(&["aB3x9", "2024-03-09", "1", "1"]),
            cells(&["aB3x9", "09-03-2024", "x", "1"]),
            cells(&["aB3x9", "09-03-2024", "1", "total"]),
        ] {
            assert!(
                matches!(StoreRecord::from_row(&row), Err(StoreError::MalformedRow { .. })),
                "{row:?}"
            );
        }
    }

    #[test]
    fn test_from_result_uses_computed_total() {
        let mut result = SessionResult::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        result.record(4);
        result.record(6);
        let record = StoreRecord::from_result("zzzzz", &result);
        assert_eq!(record.total_score, 10);
        assert_eq!(record.to_result().total_score, Some(10));
    }
}
