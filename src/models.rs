//! Core data models for co2score
//!
//! These models are shared by the catalog, the session state machine
//! and the score store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One selectable answer of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub score: u32,
}

impl AnswerOption {
    pub fn new(label: impl Into<String>, score: u32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A multiple-choice question. Options are selected by 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub max_score: u32,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, max_score: u32, options: Vec<AnswerOption>) -> Self {
        Self {
            prompt: prompt.into(),
            max_score,
            options,
        }
    }

    /// Number of options offered, i.e. the upper bound of a valid selection
    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

/// Outcome of one run through the questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub date: NaiveDate,
    /// One score per question, in catalog order
    pub answers: Vec<u32>,
    /// Set once the questionnaire has been completed
    pub total_score: Option<u32>,
}

impl SessionResult {
    /// Start an empty result dated `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            answers: Vec::new(),
            total_score: None,
        }
    }

    /// Record the score of the next answered question
    pub fn record(&mut self, score: u32) {
        self.answers.push(score);
        self.total_score = None;
    }

    /// Compute and store the total of all recorded answers
    pub fn finish(&mut self) -> u32 {
        let total = crate::scoring::total(&self.answers);
        self.total_score = Some(total);
        total
    }

    /// Whether an answer has been recorded for each of `question_count` questions
    pub fn is_complete(&self, question_count: usize) -> bool {
        self.answers.len() == question_count
    }
}

/// The person taking the questionnaire in this process run.
///
/// A returning user is one whose `previous` result was loaded from (or
/// just written to) the store; there is no separate type for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Absent until the user decides to store their results
    pub identifier: Option<String>,
    pub current: SessionResult,
    pub previous: Option<SessionResult>,
}

impl User {
    /// A first-time user with only today's date filled in
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            identifier: None,
            current: SessionResult::new(today),
            previous: None,
        }
    }

    /// A user whose earlier result was found under `identifier`
    pub fn returning(identifier: impl Into<String>, previous: SessionResult, today: NaiveDate) -> Self {
        Self {
            identifier: Some(identifier.into()),
            current: SessionResult::new(today),
            previous: Some(previous),
        }
    }

    pub fn is_returning(&self) -> bool {
        self.previous.is_some()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Make the completed current result the one future runs compare against
    pub fn mark_persisted(&mut self, identifier: String) {
        self.identifier = Some(identifier);
        self.previous = Some(self.current.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_fresh_user_is_not_returning() {
        let user = User::fresh(day());
        assert!(!user.is_returning());
        assert!(user.identifier().is_none());
        assert_eq!(user.current.date, day());
        assert!(user.current.answers.is_empty());
        assert_eq!(user.current.total_score, None);
    }

    #[test]
    fn test_finish_sums_answers() {
        let mut result = SessionResult::new(day());
        result.record(10);
        result.record(0);
        result.record(5);
        assert!(result.is_complete(3));
        assert_eq!(result.finish(), 15);
        assert_eq!(result.total_score, Some(15));
    }

    #[test]
    fn test_recording_after_finish_clears_total() {
        let mut result = SessionResult::new(day());
        result.record(4);
        result.finish();
        result.record(1);
        assert_eq!(result.total_score, None);
    }

    #[test]
    fn test_mark_persisted_promotes_current_to_previous() {
        let mut user = User::fresh(day());
        user.current.record(7);
        user.current.finish();
        user.mark_persisted("aB3x9".to_string());
        assert!(user.is_returning());
        assert_eq!(user.identifier(), Some("aB3x9"));
        assert_eq!(user.previous.as_ref().unwrap().total_score, Some(7));
    }
}
