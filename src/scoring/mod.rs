//! Questionnaire scoring
//!
//! Turns chosen options into points and sums them up.
//!
//! # Scoring Formula
//!
//! ```text
//! answer       = options[choice - 1].score      (choice is 1-based)
//! total        = Σ answers                       (0 when nothing answered)
//! max_possible = Σ question.max_score
//! ```
//!
//! Everything here is pure; the session state machine decides when to call it.

use thiserror::Error;

use crate::models::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("option {index} is out of range, valid options are 1-{len}")]
    OutOfRange { index: usize, len: usize },
}

/// Score of the option at 1-based position `choice`
pub fn score_answer(question: &Question, choice: usize) -> Result<u32, ScoringError> {
    if choice == 0 || choice > question.options.len() {
        return Err(ScoringError::OutOfRange {
            index: choice,
            len: question.options.len(),
        });
    }
    Ok(question.options[choice - 1].score)
}

/// Sum of all recorded answers, saturating at `u32::MAX`
pub fn total(answers: &[u32]) -> u32 {
    answers.iter().fold(0u32, |acc, a| acc.saturating_add(*a))
}

/// Highest total the given questions can produce, as declared by each question.
///
/// Saturates at `u32::MAX`. A loaded catalog never gets there, since
/// `Catalog::new` rejects maxima whose sum does not fit.
pub fn max_possible(questions: &[Question]) -> u32 {
    checked_max_possible(questions).unwrap_or(u32::MAX)
}

/// Like [`max_possible`], but `None` when the sum overflows a `u32`
pub fn checked_max_possible(questions: &[Question]) -> Option<u32> {
    questions
        .iter()
        .try_fold(0u32, |acc, q| acc.checked_add(q.max_score))
}
