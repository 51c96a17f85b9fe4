//! Questionnaire session state machine
//!
//! A `Session` owns the catalog, the active user and a handle on the score
//! store. Driving it is a loop of two calls:
//!
//! ```text
//! loop {
//!     draw(session.screen()?);
//!     session.handle(&read_line())?;
//! }
//! ```
//!
//! `handle` performs exactly one transition. Bad input never moves the
//! machine; it comes back as `Step::Rejected` and is shown as a notice on
//! the next screen. Only store failures and unusable bar scales are fatal.

mod screen;
mod state;

pub use screen::{BarPanel, Block, Screen};
pub use state::{EntryPurpose, State};

use std::sync::Arc;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::models::{SessionResult, User};
use crate::reporters::bar::{BarError, BarStyle};
use crate::scoring::{self, ScoringError};
use crate::store::{self, IdentifierProblem, StoreError, StoreRecord, UserStore, DATE_FORMAT};

/// Typed at the identifier prompt to skip the lookup (any case)
pub const ESCAPE: &str = "q";

const TITLE: &str = "CO2 SCORE";
const PRESS_ENTER: &str = "Press enter to continue.....";

/// Why a typed user id was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierIssue {
    Malformed(IdentifierProblem),
    Unknown,
}

impl std::fmt::Display for IdentifierIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierIssue::Malformed(problem) => write!(f, "{problem}"),
            IdentifierIssue::Unknown => f.write_str("no results are stored under that user id"),
        }
    }
}

/// Input the current state cannot accept. Recovered by re-prompting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Data invalid: {input:?} is not a valid choice, please select {expected}")]
    InputOutOfRange { input: String, expected: String },

    #[error("User data invalid: {0}")]
    IdentifierInvalid(IdentifierIssue),
}

/// Failures that end the session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("score store failed: {0}")]
    Store(#[from] StoreError),

    #[error("cannot draw score bar: {0}")]
    Chart(#[from] BarError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("no identified user is active in state {0}")]
    NoActiveUser(State),

    #[error("question {0} is not in the questionnaire")]
    MissingQuestion(usize),

    #[error("questionnaire ended with {answered} of {expected} answers recorded")]
    IncompleteAnswers { answered: usize, expected: usize },
}

/// Result of feeding one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Advanced,
    Rejected(InputError),
}

/// Internal short-circuit so handlers can `?` both kinds of failure
enum Interrupt {
    Rejected(InputError),
    Fatal(SessionError),
}

impl From<InputError> for Interrupt {
    fn from(err: InputError) -> Self {
        Interrupt::Rejected(err)
    }
}

impl From<SessionError> for Interrupt {
    fn from(err: SessionError) -> Self {
        Interrupt::Fatal(err)
    }
}

impl From<StoreError> for Interrupt {
    fn from(err: StoreError) -> Self {
        Interrupt::Fatal(err.into())
    }
}

impl From<ScoringError> for Interrupt {
    fn from(err: ScoringError) -> Self {
        Interrupt::Fatal(err.into())
    }
}

/// Parse a 1-based menu selection in `1..=max`
fn choose(input: &str, max: usize) -> Result<usize, InputError> {
    match input.parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(InputError::InputOutOfRange {
            input: input.to_string(),
            expected: format!("an option from 1 - {max}"),
        }),
    }
}

pub struct Session {
    catalog: Catalog,
    store: Arc<dyn UserStore>,
    bar_style: BarStyle,
    rng: ChaCha8Rng,
    today: NaiveDate,
    state: State,
    user: Option<User>,
    notice: Option<String>,
}

impl Session {
    /// A session at the main menu with no active user
    pub fn new(catalog: Catalog, store: Arc<dyn UserStore>) -> Self {
        Self {
            catalog,
            store,
            bar_style: BarStyle::default(),
            rng: ChaCha8Rng::from_os_rng(),
            today: chrono::Local::now().date_naive(),
            state: State::MainMenu,
            user: None,
            notice: None,
        }
    }

    pub fn with_bar_style(mut self, bar_style: BarStyle) -> Self {
        self.bar_style = bar_style;
        self
    }

    /// Make generated user ids reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Date stamped on new results
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    fn identified(&self) -> Option<&str> {
        self.user.as_ref().and_then(User::identifier)
    }

    fn active_user(&self) -> Result<&User, SessionError> {
        self.user
            .as_ref()
            .ok_or(SessionError::NoActiveUser(self.state))
    }

    fn active_user_mut(&mut self) -> Result<&mut User, SessionError> {
        let state = self.state;
        self.user.as_mut().ok_or(SessionError::NoActiveUser(state))
    }

    fn main_menu(&self) -> Vec<&'static str> {
        let mut items = vec![
            "View instructions",
            "Start the questionnaire",
            "Administer data",
            "Exit software",
        ];
        if self.identified().is_some() {
            items.push("Log out");
        }
        items
    }

    // ---- transitions ----

    /// Feed one line of input to the current state
    pub fn handle(&mut self, input: &str) -> Result<Step, SessionError> {
        let input = input.trim();
        let before = self.state;
        self.notice = None;

        let outcome = match before {
            State::MainMenu => self.on_main_menu(input),
            State::Instructions => self.on_instructions(input),
            State::IdentifierEntry(purpose) => self.on_identifier_entry(purpose, input),
            State::Questionnaire(index) => self.on_question(index, input),
            State::AnswerFeedback { question, .. } => self.after_feedback(question),
            State::Results => self.after_results(),
            State::PersistenceDecision => self.on_persistence_decision(input),
            State::IdentifierIssued | State::LoggedOut => {
                self.state = State::MainMenu;
                Ok(())
            }
            State::Administration => self.on_administration(input),
            State::PreviousReview => {
                self.state = State::Administration;
                Ok(())
            }
            State::Exited => Ok(()),
        };

        match outcome {
            Ok(()) => {
                debug!("Session {} -> {}", before, self.state);
                Ok(Step::Advanced)
            }
            Err(Interrupt::Rejected(err)) => {
                debug!("Rejected input in {}: {}", before, err);
                self.notice = Some(err.to_string());
                Ok(Step::Rejected(err))
            }
            Err(Interrupt::Fatal(err)) => Err(err),
        }
    }

    fn on_main_menu(&mut self, input: &str) -> Result<(), Interrupt> {
        match choose(input, self.main_menu().len())? {
            1 => self.state = State::Instructions,
            2 => self.begin_questionnaire(),
            3 => {
                self.state = if self.identified().is_some() {
                    State::Administration
                } else {
                    State::IdentifierEntry(EntryPurpose::Administration)
                }
            }
            4 => self.state = State::Exited,
            _ => self.log_out(),
        }
        Ok(())
    }

    fn on_instructions(&mut self, input: &str) -> Result<(), Interrupt> {
        match choose(input, 2)? {
            1 => self.begin_questionnaire(),
            _ => self.state = State::MainMenu,
        }
        Ok(())
    }

    fn begin_questionnaire(&mut self) {
        match self.user.as_mut() {
            Some(user) => {
                user.current = SessionResult::new(self.today);
                self.state = State::Questionnaire(0);
            }
            None => self.state = State::IdentifierEntry(EntryPurpose::Questionnaire),
        }
    }

    fn log_out(&mut self) {
        if let Some(user) = self.user.take() {
            debug!("Logged out {}", user.identifier().unwrap_or("anonymous user"));
        }
        self.state = State::LoggedOut;
    }

    fn on_identifier_entry(&mut self, purpose: EntryPurpose, input: &str) -> Result<(), Interrupt> {
        if input.is_empty() || input.eq_ignore_ascii_case(ESCAPE) {
            match purpose {
                EntryPurpose::Questionnaire => {
                    self.user = Some(User::fresh(self.today));
                    self.state = State::Questionnaire(0);
                }
                EntryPurpose::Administration => self.state = State::MainMenu,
            }
            return Ok(());
        }

        store::validate_identifier(input)
            .map_err(|problem| InputError::IdentifierInvalid(IdentifierIssue::Malformed(problem)))?;
        let record = self
            .store
            .find(input)?
            .ok_or(InputError::IdentifierInvalid(IdentifierIssue::Unknown))?;

        if record.answers.len() != self.catalog.len() {
            warn!(
                "Stored results for {} hold {} answers, the questionnaire has {} questions",
                record.identifier,
                record.answers.len(),
                self.catalog.len()
            );
        }
        debug!("Loaded previous results for {}", record.identifier);

        self.user = Some(User::returning(
            record.identifier.clone(),
            record.to_result(),
            self.today,
        ));
        self.state = match purpose {
            EntryPurpose::Questionnaire => State::Questionnaire(0),
            EntryPurpose::Administration => State::Administration,
        };
        Ok(())
    }

    fn on_question(&mut self, index: usize, input: &str) -> Result<(), Interrupt> {
        let question = self
            .catalog
            .question(index)
            .ok_or(SessionError::MissingQuestion(index))?;
        let choice = choose(input, question.option_count())?;
        let score = scoring::score_answer(question, choice)?;

        self.active_user_mut()?.current.record(score);
        self.state = State::AnswerFeedback {
            question: index,
            choice,
        };
        Ok(())
    }

    fn after_feedback(&mut self, question: usize) -> Result<(), Interrupt> {
        if question + 1 < self.catalog.len() {
            self.state = State::Questionnaire(question + 1);
            return Ok(());
        }
        let expected = self.catalog.len();
        let current = &mut self.active_user_mut()?.current;
        if !current.is_complete(expected) {
            return Err(SessionError::IncompleteAnswers {
                answered: current.answers.len(),
                expected,
            }
            .into());
        }
        let total = current.finish();
        debug!("Questionnaire finished with a total of {}", total);
        self.state = State::Results;
        Ok(())
    }

    fn after_results(&mut self) -> Result<(), Interrupt> {
        if self.active_user()?.is_returning() {
            self.persist_update()?;
            self.notice = Some("Your results have been updated".to_string());
            self.state = State::MainMenu;
        } else {
            self.state = State::PersistenceDecision;
        }
        Ok(())
    }

    /// Overwrite the stored row of a returning user with the full new result
    fn persist_update(&mut self) -> Result<(), SessionError> {
        let state = self.state;
        let user = self.user.as_mut().ok_or(SessionError::NoActiveUser(state))?;
        let identifier = user
            .identifier
            .clone()
            .ok_or(SessionError::NoActiveUser(state))?;
        let record = StoreRecord::from_result(identifier.clone(), &user.current);
        self.store.update(&identifier, &record)?;
        user.mark_persisted(identifier);
        Ok(())
    }

    fn on_persistence_decision(&mut self, input: &str) -> Result<(), Interrupt> {
        if input.eq_ignore_ascii_case("y") {
            let identifier = store::generate_unique(self.store.as_ref(), &mut self.rng)?;
            let state = self.state;
            let user = self.user.as_mut().ok_or(SessionError::NoActiveUser(state))?;
            let record = StoreRecord::from_result(identifier.clone(), &user.current);
            self.store.append(&record)?;
            user.mark_persisted(identifier);
            self.state = State::IdentifierIssued;
        } else if input.eq_ignore_ascii_case("n") {
            self.user = None;
            debug!("Results discarded");
            self.state = State::MainMenu;
        } else {
            return Err(InputError::InputOutOfRange {
                input: input.to_string(),
                expected: "\"y\" or \"n\"".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn on_administration(&mut self, input: &str) -> Result<(), Interrupt> {
        let Some(identifier) = self.identified().map(str::to_string) else {
            self.state = State::IdentifierEntry(EntryPurpose::Administration);
            return Ok(());
        };

        match choose(input, 3)? {
            1 => self.state = State::PreviousReview,
            2 => {
                self.store.delete(&identifier)?;
                self.log_out();
                self.notice = Some("Your data has been deleted".to_string());
            }
            _ => self.state = State::MainMenu,
        }
        Ok(())
    }

    // ---- presentation ----

    /// Describe what the current state shows
    pub fn screen(&self) -> Result<Screen, SessionError> {
        let screen = match self.state {
            State::MainMenu => self.main_menu_screen(),
            State::Instructions => Screen::new("Instructions")
                .text(self.catalog.instructions())
                .blank()
                .menu(["Continue to questionnaire", "Return to main menu"])
                .prompt("Please enter an option [1 or 2]: "),
            State::IdentifierEntry(purpose) => Self::identifier_screen(purpose),
            State::Questionnaire(index) => self.question_screen(index)?,
            State::AnswerFeedback { question, choice } => self.feedback_screen(question, choice)?,
            State::Results => self.results_screen()?,
            State::PersistenceDecision => Screen::new("Results")
                .text("Would you like your results to be stored?")
                .prompt("Please enter \"y\" or \"n\": "),
            State::IdentifierIssued => self.identifier_issued_screen()?,
            State::Administration => self.administration_screen()?,
            State::PreviousReview => self.review_screen()?,
            State::LoggedOut => Screen::new("Logged out")
                .text("You have been logged out")
                .prompt(PRESS_ENTER),
            State::Exited => Screen::new("EXITING").text("Thank you for calculating your co2 score"),
        };
        Ok(screen.with_notice(self.notice.clone()))
    }

    fn panel(&self, caption: String, score: u32, max_score: u32) -> Result<BarPanel, BarError> {
        Ok(BarPanel {
            caption,
            chart: self
                .bar_style
                .render(f64::from(score), f64::from(max_score))?,
            max_label: max_score,
        })
    }

    fn main_menu_screen(&self) -> Screen {
        let items = self.main_menu();
        let mut screen = Screen::new(TITLE);
        if let Some(identifier) = self.identified() {
            screen = screen.status(format!("User logged in: {identifier}"));
        }
        screen
            .text("Calculate your co2 score")
            .blank()
            .text("Main menu")
            .prompt(format!("Please select an option [1-{}]: ", items.len()))
            .menu(items)
    }

    fn identifier_screen(purpose: EntryPurpose) -> Screen {
        match purpose {
            EntryPurpose::Questionnaire => Screen::new("Load previous results")
                .text("If you have a user id to retrieve previous data,")
                .text(format!("enter it now. Enter \"{ESCAPE}\" to skip straight to the questionnaire."))
                .prompt("User id, or press enter to continue: "),
            EntryPurpose::Administration => Screen::new("Administer data")
                .text("Enter the user id your results were stored under.")
                .text(format!("Press enter or enter \"{ESCAPE}\" to return to the main menu."))
                .prompt("User id: "),
        }
    }

    fn question_screen(&self, index: usize) -> Result<Screen, SessionError> {
        let question = self
            .catalog
            .question(index)
            .ok_or(SessionError::MissingQuestion(index))?;
        Ok(
            Screen::new(format!("Question {} of {}", index + 1, self.catalog.len()))
                .text(question.prompt.as_str())
                .blank()
                .menu(question.options.iter().map(|o| o.label.as_str()))
                .prompt(format!(
                    "Please select an option [1-{}]: ",
                    question.option_count()
                )),
        )
    }

    fn feedback_screen(&self, index: usize, choice: usize) -> Result<Screen, SessionError> {
        let question = self
            .catalog
            .question(index)
            .ok_or(SessionError::MissingQuestion(index))?;
        let option = choice
            .checked_sub(1)
            .and_then(|i| question.options.get(i))
            .ok_or(ScoringError::OutOfRange {
                index: choice,
                len: question.option_count(),
            })?;
        let user = self.active_user()?;

        let mut screen = Screen::new(format!("Question {} of {}", index + 1, self.catalog.len()))
            .text(format!("You chose option:\n'{}'", option.label))
            .text(format!(
                "{} points have been added to your carbon score",
                option.score
            ))
            .blank()
            .bar(self.panel(
                format!("Your score is {}", option.score),
                option.score,
                question.max_score,
            )?);

        // Rows stored against an older questionnaire may be shorter
        if let Some(previous) = &user.previous {
            if let Some(score) = previous.answers.get(index) {
                screen = screen.blank().bar(self.panel(
                    format!(
                        "Your previous score on {} was {}",
                        previous.date.format(DATE_FORMAT),
                        score
                    ),
                    *score,
                    question.max_score,
                )?);
            }
        }

        Ok(screen.prompt(PRESS_ENTER))
    }

    fn results_screen(&self) -> Result<Screen, SessionError> {
        let user = self.active_user()?;
        let max = self.catalog.max_possible();
        let total = user
            .current
            .total_score
            .unwrap_or_else(|| scoring::total(&user.current.answers));

        let mut screen = Screen::new("Results")
            .text(format!("Your total carbon footprint score is {total}"))
            .blank()
            .bar(self.panel(format!("Your score is {total}"), total, max)?);

        // Compared against today's maximum, whatever it was back then
        if let Some(previous) = &user.previous {
            let previous_total = previous
                .total_score
                .unwrap_or_else(|| scoring::total(&previous.answers));
            screen = screen.blank().bar(self.panel(
                format!(
                    "Your previous score on {} was {}",
                    previous.date.format(DATE_FORMAT),
                    previous_total
                ),
                previous_total,
                max,
            )?);
        }

        let prompt = if user.is_returning() {
            "Press enter to save your results and continue....."
        } else {
            PRESS_ENTER
        };
        Ok(screen.blank().text(self.catalog.summary()).prompt(prompt))
    }

    fn identifier_issued_screen(&self) -> Result<Screen, SessionError> {
        let identifier = self
            .identified()
            .ok_or(SessionError::NoActiveUser(self.state))?;
        Ok(Screen::new("Results stored")
            .text("Enter this user id next time to compare your answers with")
            .text("today's. Keep it safe, it cannot be retrieved if lost.")
            .blank()
            .text(format!("Your user id is: {identifier}"))
            .prompt("Press enter to continue when ready ....."))
    }

    fn administration_screen(&self) -> Result<Screen, SessionError> {
        let identifier = self
            .identified()
            .ok_or(SessionError::NoActiveUser(self.state))?;
        Ok(Screen::new("Administer data")
            .status(format!("User logged in: {identifier}"))
            .menu(["Review previous score", "Delete data", "Return to main menu"])
            .prompt("Please select an option [1-3]: "))
    }

    fn review_screen(&self) -> Result<Screen, SessionError> {
        let previous = self
            .active_user()?
            .previous
            .as_ref()
            .ok_or(SessionError::NoActiveUser(self.state))?;
        let total = previous
            .total_score
            .unwrap_or_else(|| scoring::total(&previous.answers));
        Ok(Screen::new("Previous score")
            .bar(self.panel(
                format!(
                    "Your previous score on {} was {}",
                    previous.date.format(DATE_FORMAT),
                    total
                ),
                total,
                self.catalog.max_possible(),
            )?)
            .blank()
            .text(self.catalog.summary())
            .prompt(PRESS_ENTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerOption, Question};
    use crate::store::MemoryStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::new(
            "Answer every question.",
            "Lower is better.",
            vec![
                Question::new(
                    "First?",
                    10,
                    vec![AnswerOption::new("Low", 0), AnswerOption::new("High", 10)],
                ),
                Question::new(
                    "Second?",
                    20,
                    vec![AnswerOption::new("Low", 0), AnswerOption::new("High", 20)],
                ),
            ],
        )
        .unwrap()
    }

    fn session(store: Arc<MemoryStore>) -> Session {
        Session::new(catalog(), store).with_seed(7).with_today(day())
    }

    fn feed(session: &mut Session, inputs: &[&str]) {
        for input in inputs {
            assert_eq!(
                session.handle(input).unwrap(),
                Step::Advanced,
                "input {input:?} in {}",
                session.state()
            );
        }
    }

    fn stored(store: &MemoryStore, id: &str, answers: Vec<u32>) {
        let total_score = answers.iter().sum();
        store
            .append(&StoreRecord {
                identifier: id.to_string(),
                date: NaiveDate::from_ymd_opt(2023, 11, 2).unwrap(),
                answers,
                total_score,
            })
            .unwrap();
    }

    #[test]
    fn test_starts_at_main_menu() {
        let session = session(Arc::new(MemoryStore::new()));
        assert_eq!(session.state(), State::MainMenu);
        assert!(session.user().is_none());
        let screen = session.screen().unwrap();
        assert_eq!(screen.menu_items().unwrap().len(), 4);
        assert_eq!(screen.prompt, "Please select an option [1-4]: ");
    }

    #[test]
    fn test_out_of_range_input_stays_put() {
        let mut session = session(Arc::new(MemoryStore::new()));
        for input in ["0", "5", "abc", "", "-1", "1.5"] {
            let step = session.handle(input).unwrap();
            assert!(
                matches!(step, Step::Rejected(InputError::InputOutOfRange { .. })),
                "{input:?}"
            );
            assert_eq!(session.state(), State::MainMenu);
            assert!(session.notice().is_some());
        }
        // The notice is gone after the next accepted input
        feed(&mut session, &["1"]);
        assert_eq!(session.state(), State::Instructions);
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_input_is_trimmed() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &[" 1 \r"]);
        assert_eq!(session.state(), State::Instructions);
    }

    #[test]
    fn test_instructions_lead_to_identifier_entry() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["1", "1"]);
        assert_eq!(
            session.state(),
            State::IdentifierEntry(EntryPurpose::Questionnaire)
        );

        let mut session = self::session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["1", "2"]);
        assert_eq!(session.state(), State::MainMenu);
    }

    #[test]
    fn test_escape_starts_fresh_user() {
        for escape in ["q", "Q"] {
            let mut session = session(Arc::new(MemoryStore::new()));
            feed(&mut session, &["2", escape]);
            assert_eq!(session.state(), State::Questionnaire(0));
            let user = session.user().unwrap();
            assert!(!user.is_returning());
            assert_eq!(user.current.date, day());
        }
    }

    #[test]
    fn test_escape_from_administration_returns_to_menu() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["3"]);
        assert_eq!(
            session.state(),
            State::IdentifierEntry(EntryPurpose::Administration)
        );
        feed(&mut session, &["q"]);
        assert_eq!(session.state(), State::MainMenu);
        assert!(session.user().is_none());
    }

    #[test]
    fn test_malformed_and_unknown_identifiers_reprompt() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["2"]);

        assert_eq!(
            session.handle("abc").unwrap(),
            Step::Rejected(InputError::IdentifierInvalid(IdentifierIssue::Malformed(
                IdentifierProblem::WrongLength(3)
            )))
        );
        assert_eq!(
            session.handle("ab-d!").unwrap(),
            Step::Rejected(InputError::IdentifierInvalid(IdentifierIssue::Malformed(
                IdentifierProblem::NotAlphanumeric
            )))
        );
        assert_eq!(
            session.handle("abcde").unwrap(),
            Step::Rejected(InputError::IdentifierInvalid(IdentifierIssue::Unknown))
        );
        assert_eq!(
            session.state(),
            State::IdentifierEntry(EntryPurpose::Questionnaire)
        );
        assert!(session
            .screen()
            .unwrap()
            .notice
            .unwrap()
            .starts_with("User data invalid"));
    }

    #[test]
    fn test_feedback_shows_question_bar() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["2", "", "2"]);
        assert_eq!(
            session.state(),
            State::AnswerFeedback {
                question: 0,
                choice: 2
            }
        );
        let screen = session.screen().unwrap();
        let bars = screen.bars();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].max_label, 10);
        assert_eq!(bars[0].chart.filled, bars[0].chart.width());
        assert!(screen.plain_text().contains("'High'"));
    }

    #[test]
    fn test_feedback_shows_previous_answer_for_returning_user() {
        let store = Arc::new(MemoryStore::new());
        stored(&store, "aB3x9", vec![10, 20]);
        let mut session = session(store);
        feed(&mut session, &["2", "aB3x9", "1"]);
        let screen = session.screen().unwrap();
        let bars = screen.bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].chart.filled, 0);
        assert_eq!(bars[1].chart.filled, bars[1].chart.width());
        assert!(bars[1].caption.contains("02-11-2023"));
    }

    #[test]
    fn test_results_need_an_answer_per_question() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["2", "", "1", "", "1"]);
        session.user.as_mut().unwrap().current.answers.pop();
        assert!(matches!(
            session.handle(""),
            Err(SessionError::IncompleteAnswers {
                answered: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_short_stored_row_skips_previous_bar() {
        let store = Arc::new(MemoryStore::new());
        stored(&store, "aB3x9", vec![10]);
        let mut session = session(store);
        feed(&mut session, &["2", "aB3x9", "1", "", "1"]);
        assert_eq!(session.screen().unwrap().bars().len(), 1);
    }

    #[test]
    fn test_question_option_out_of_range() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["2", ""]);
        assert!(matches!(
            session.handle("3").unwrap(),
            Step::Rejected(InputError::InputOutOfRange { .. })
        ));
        assert_eq!(session.state(), State::Questionnaire(0));
        assert!(session.user().unwrap().current.answers.is_empty());
    }

    #[test]
    fn test_persistence_decision_requires_y_or_n() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session(store.clone());
        feed(&mut session, &["2", "", "1", "", "1", "", ""]);
        assert_eq!(session.state(), State::PersistenceDecision);
        assert!(matches!(
            session.handle("maybe").unwrap(),
            Step::Rejected(InputError::InputOutOfRange { .. })
        ));
        assert_eq!(session.state(), State::PersistenceDecision);

        feed(&mut session, &["Y"]);
        assert_eq!(session.state(), State::IdentifierIssued);
        let id = session.user().unwrap().identifier().unwrap().to_string();
        assert!(store::is_well_formed(&id));
        assert!(session.screen().unwrap().plain_text().contains(&id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_log_out_only_offered_to_identified_user() {
        let store = Arc::new(MemoryStore::new());
        stored(&store, "aB3x9", vec![1, 2]);
        let mut session = session(store);

        assert!(session.handle("5").unwrap() != Step::Advanced);

        feed(&mut session, &["3", "aB3x9"]);
        assert_eq!(session.state(), State::Administration);
        feed(&mut session, &["3"]);
        let screen = session.screen().unwrap();
        assert_eq!(screen.menu_items().unwrap().len(), 5);
        assert_eq!(screen.status.as_deref(), Some("User logged in: aB3x9"));

        feed(&mut session, &["5"]);
        assert_eq!(session.state(), State::LoggedOut);
        assert!(session.user().is_none());
        feed(&mut session, &[""]);
        assert_eq!(session.state(), State::MainMenu);
        assert_eq!(session.screen().unwrap().menu_items().unwrap().len(), 4);
    }

    #[test]
    fn test_review_previous_score() {
        let store = Arc::new(MemoryStore::new());
        stored(&store, "aB3x9", vec![5, 10]);
        let mut session = session(store);
        feed(&mut session, &["3", "aB3x9", "1"]);
        assert_eq!(session.state(), State::PreviousReview);
        let screen = session.screen().unwrap();
        let bars = screen.bars();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].max_label, 30);
        assert!(bars[0].caption.ends_with("was 15"));
        feed(&mut session, &[""]);
        assert_eq!(session.state(), State::Administration);
    }

    #[test]
    fn test_exit() {
        let mut session = session(Arc::new(MemoryStore::new()));
        feed(&mut session, &["4"]);
        assert!(session.is_finished());
        assert!(session.screen().unwrap().prompt.is_empty());
        // Further input is ignored
        feed(&mut session, &["1"]);
        assert_eq!(session.state(), State::Exited);
    }

    #[test]
    fn test_zero_maximum_never_reaches_a_session() {
        let zero = Catalog::new(
            "x",
            "y",
            vec![Question::new("Zero?", 0, vec![AnswerOption::new("None", 0)])],
        );
        assert!(matches!(
            zero,
            Err(crate::catalog::CatalogError::ZeroMaxScore { index: 1 })
        ));
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let store = Arc::new(MemoryStore::new());
        store.insert_row(vec!["aB3x9".to_string(), "not a date".to_string(), "1".to_string()]);
        let mut session = session(store);
        feed(&mut session, &["2"]);
        assert!(matches!(
            session.handle("aB3x9"),
            Err(SessionError::Store(StoreError::MalformedRow { .. }))
        ));
    }
}
