//! Output reporters for co2score
//!
//! - `bar` - proportional score bars
//! - `text` - terminal screens and the ANSI catalog outline
//! - `json` - machine-readable catalog outline

pub mod bar;
mod json;
pub mod text;

use crate::catalog::Catalog;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats for `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

/// Render a catalog outline in the specified format
pub fn report(catalog: &Catalog, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_catalog(catalog)),
        OutputFormat::Json => json::render(catalog),
    }
}
