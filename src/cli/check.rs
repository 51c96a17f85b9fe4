//! Check command - validate the questionnaire

use anyhow::Result;
use console::style;

use crate::catalog::Catalog;
use crate::reporters::{self, OutputFormat};

pub fn run(catalog: &Catalog, format: OutputFormat) -> Result<()> {
    let output = reporters::report(catalog, format)?;

    // JSON stays machine-readable
    if format == OutputFormat::Text {
        println!("{} Questionnaire OK", style("✓").green());
    }
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
