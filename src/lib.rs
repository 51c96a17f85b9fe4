//! co2score - carbon footprint questionnaire
//!
//! A terminal questionnaire that scores each answer, draws the result as a
//! proportional bar and keeps results in a score sheet so a returning user
//! can compare against their last visit.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod models;
pub mod reporters;
pub mod scoring;
pub mod session;
pub mod store;
pub mod terminal;
