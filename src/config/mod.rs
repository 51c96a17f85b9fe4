//! Configuration module for co2score
//!
//! This module handles:
//! - Score sheet location
//! - Questionnaire source and text wrapping
//! - Bar geometry and risk threshold

mod user_config;

pub use user_config::{
    CatalogConfig, DisplayConfig, StoreConfig, UserConfig, CATALOG_ENV, STORE_ENV,
};
