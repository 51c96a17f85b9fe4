//! Questionnaire catalog
//!
//! The catalog is read from a row table, one row per line of the source
//! spreadsheet:
//!
//! ```text
//! ["Instructions", "<text>"]
//! ["Question",     "<prompt>", "Max possible score 14"]
//! ["Option",       "<label>",  "14"]
//! ...
//! ["Summary",      "<text>"]
//! ```
//!
//! Row order defines question and option order. The `Summary` row ends the
//! table. All text is wrapped once, at load time.

pub mod wrap;

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use crate::models::{AnswerOption, Question};

pub use wrap::wrap;

/// Questionnaire compiled into the binary
pub const EMBEDDED_QUESTIONNAIRE: &str = include_str!("../../assets/questionnaire.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read questionnaire {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("questionnaire is not a table of text rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: expected at least {expected} cells")]
    ShortRow { row: usize, expected: usize },

    #[error("row {row}: option appears before any question")]
    OrphanOption { row: usize },

    #[error("row {row}: cannot read a max score from {value:?}")]
    BadMaxScore { row: usize, value: String },

    #[error("row {row}: cannot read an option score from {value:?}")]
    BadOptionScore { row: usize, value: String },

    #[error("row {row}: option scores {score}, above its question's max of {max}")]
    OptionAboveMax { row: usize, score: u32, max: u32 },

    #[error("question {index} has no options")]
    NoOptions { index: usize },

    #[error("question {index} has a max score of 0")]
    ZeroMaxScore { index: usize },

    #[error("question max scores add up to more than {}", u32::MAX)]
    TotalTooLarge,

    #[error("questionnaire has no instructions row")]
    MissingInstructions,

    #[error("questionnaire has no summary row")]
    MissingSummary,

    #[error("questionnaire has no questions")]
    NoQuestions,
}

/// The ordered, read-only set of questions plus the surrounding text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    instructions: String,
    summary: String,
    questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Instructions,
    Question,
    Option,
    Summary,
}

impl RowKind {
    /// Markers are matched by substring, so "Question 3" is a question row
    fn of(marker: &str) -> Option<Self> {
        if marker.contains("Instructions") {
            Some(RowKind::Instructions)
        } else if marker.contains("Question") {
            Some(RowKind::Question)
        } else if marker.contains("Option") {
            Some(RowKind::Option)
        } else if marker.contains("Summary") {
            Some(RowKind::Summary)
        } else {
            None
        }
    }
}

fn max_score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:max\s+possible\s+score)?\s*(\d+)\s*$").expect("valid regex")
    })
}

/// Parse `"Max possible score 14"` (or a bare `"14"`) into 14
pub fn parse_max_score(value: &str) -> Option<u32> {
    max_score_pattern()
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn cell(row: &[String], index: usize, row_number: usize) -> Result<&str, CatalogError> {
    row.get(index)
        .map(String::as_str)
        .ok_or(CatalogError::ShortRow {
            row: row_number,
            expected: index + 1,
        })
}

impl Catalog {
    /// Build a catalog from already parsed parts
    pub fn new(
        instructions: impl Into<String>,
        summary: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::NoQuestions);
        }
        if let Some(index) = questions.iter().position(|q| q.options.is_empty()) {
            return Err(CatalogError::NoOptions { index: index + 1 });
        }
        // Bars scale against these, so a zero max cannot be drawn
        if let Some(index) = questions.iter().position(|q| q.max_score == 0) {
            return Err(CatalogError::ZeroMaxScore { index: index + 1 });
        }
        if crate::scoring::checked_max_possible(&questions).is_none() {
            return Err(CatalogError::TotalTooLarge);
        }
        Ok(Self {
            instructions: instructions.into(),
            summary: summary.into(),
            questions,
        })
    }

    /// Parse the row table, wrapping all text at `wrap_width`
    pub fn from_rows(rows: &[Vec<String>], wrap_width: usize) -> Result<Self, CatalogError> {
        let mut instructions = None;
        let mut summary = None;
        let mut questions: Vec<Question> = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let row_number = i + 1;
            let Some(marker) = row.first() else {
                continue;
            };
            let Some(kind) = RowKind::of(marker) else {
                debug!("Skipping row {} with unknown marker {:?}", row_number, marker);
                continue;
            };

            match kind {
                RowKind::Instructions => {
                    instructions = Some(wrap(cell(row, 1, row_number)?, wrap_width));
                }
                RowKind::Question => {
                    let prompt = cell(row, 1, row_number)?;
                    let raw_max = cell(row, 2, row_number)?;
                    let max_score =
                        parse_max_score(raw_max).ok_or_else(|| CatalogError::BadMaxScore {
                            row: row_number,
                            value: raw_max.to_string(),
                        })?;
                    questions.push(Question::new(wrap(prompt, wrap_width), max_score, Vec::new()));
                }
                RowKind::Option => {
                    let label = cell(row, 1, row_number)?;
                    let raw_score = cell(row, 2, row_number)?;
                    let score: u32 =
                        raw_score
                            .trim()
                            .parse()
                            .map_err(|_| CatalogError::BadOptionScore {
                                row: row_number,
                                value: raw_score.to_string(),
                            })?;
                    let question = questions
                        .last_mut()
                        .ok_or(CatalogError::OrphanOption { row: row_number })?;
                    if score > question.max_score {
                        return Err(CatalogError::OptionAboveMax {
                            row: row_number,
                            score,
                            max: question.max_score,
                        });
                    }
                    question
                        .options
                        .push(AnswerOption::new(wrap(label, wrap_width), score));
                }
                RowKind::Summary => {
                    summary = Some(wrap(cell(row, 1, row_number)?, wrap_width));
                    break;
                }
            }
        }

        let instructions = instructions.ok_or(CatalogError::MissingInstructions)?;
        let summary = summary.ok_or(CatalogError::MissingSummary)?;
        let catalog = Self::new(instructions, summary, questions)?;
        debug!(
            "Loaded catalog with {} questions (max score {})",
            catalog.len(),
            catalog.max_possible()
        );
        Ok(catalog)
    }

    /// Parse a row table serialized as JSON (`[["Question", "...", "..."], ...]`)
    pub fn from_json(json: &str, wrap_width: usize) -> Result<Self, CatalogError> {
        let rows: Vec<Vec<String>> = serde_json::from_str(json)?;
        Self::from_rows(&rows, wrap_width)
    }

    /// Load a JSON row table from disk
    pub fn load_file(path: &Path, wrap_width: usize) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, wrap_width)
    }

    /// The carbon footprint questionnaire shipped with the binary
    pub fn embedded(wrap_width: usize) -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_QUESTIONNAIRE, wrap_width)
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn max_possible(&self) -> u32 {
        crate::scoring::max_possible(&self.questions)
    }
}
