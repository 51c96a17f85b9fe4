//! Session states

/// What the identifier prompt leads to once it is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPurpose {
    Questionnaire,
    Administration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    MainMenu,
    Instructions,
    IdentifierEntry(EntryPurpose),
    /// Presenting the question at this index
    Questionnaire(usize),
    /// Showing the points just added for `question`
    AnswerFeedback { question: usize, choice: usize },
    Results,
    PersistenceDecision,
    /// Showing a freshly generated user id
    IdentifierIssued,
    Administration,
    PreviousReview,
    LoggedOut,
    Exited,
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Exited)
    }

    /// Short name for logs
    pub fn label(&self) -> String {
        match self {
            State::MainMenu => "main-menu".to_string(),
            State::Instructions => "instructions".to_string(),
            State::IdentifierEntry(EntryPurpose::Questionnaire) => {
                "identifier-entry(questionnaire)".to_string()
            }
            State::IdentifierEntry(EntryPurpose::Administration) => {
                "identifier-entry(administration)".to_string()
            }
            State::Questionnaire(i) => format!("question({})", i + 1),
            State::AnswerFeedback { question, .. } => format!("feedback({})", question + 1),
            State::Results => "results".to_string(),
            State::PersistenceDecision => "persistence-decision".to_string(),
            State::IdentifierIssued => "identifier-issued".to_string(),
            State::Administration => "administration".to_string(),
            State::PreviousReview => "previous-review".to_string(),
            State::LoggedOut => "logged-out".to_string(),
            State::Exited => "exited".to_string(),
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
