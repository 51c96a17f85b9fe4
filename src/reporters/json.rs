//! JSON reporter
//!
//! Outputs the loaded questionnaire as pretty-printed JSON, for piping the
//! result of `co2score check` into other tools.

use crate::catalog::Catalog;
use anyhow::Result;

/// Render the catalog as JSON
pub fn render(catalog: &Catalog) -> Result<String> {
    let value = serde_json::json!({
        "question_count": catalog.len(),
        "max_possible": catalog.max_possible(),
        "instructions": catalog.instructions(),
        "summary": catalog.summary(),
        "questions": catalog.questions(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
