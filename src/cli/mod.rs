//! CLI command definitions and handlers

mod check;
mod play;

pub use play::run_session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::{UserConfig, CATALOG_ENV, STORE_ENV};
use crate::reporters::OutputFormat;
use crate::store::{MemoryStore, SheetStore, UserStore};

/// co2score - Calculate your carbon footprint score
///
/// Answers are scored per question and compared with the results you
/// stored last time.
#[derive(Parser, Debug)]
#[command(name = "co2score")]
#[command(
    version,
    about = "Terminal questionnaire that estimates your carbon footprint and compares it with your last visit",
    after_help = "\
Examples:
  co2score                              Start the questionnaire
  co2score --store ./scores.redb        Keep results in a specific score sheet
  co2score --ephemeral                  Nothing is written to disk
  co2score check                        Validate the questionnaire
  co2score check --catalog q.json -f json
  co2score config init                  Write an example config file"
)]
pub struct Cli {
    /// Questionnaire JSON file (default: the built-in questionnaire)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Score sheet file (default: <data dir>/co2score/scores.redb)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Keep results in memory only for this run
    #[arg(long, global = true, conflicts_with = "store")]
    pub ephemeral: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate the questionnaire, then print its outline
    Check {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text")]
        format: OutputFormat,
    },

    /// Manage configuration (init or show)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with example settings
    Init,
    /// Show current config and paths
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = UserConfig::load()?;

    match &cli.command {
        Some(Commands::Check { format }) => {
            let catalog = load_catalog(&cli, &config)?;
            check::run(&catalog, *format)
        }

        Some(Commands::Config { action }) => run_config_action(action, &cli, &config),

        None => {
            let catalog = load_catalog(&cli, &config)?;
            let store = open_store(&cli, &config)?;
            play::run(catalog, store, config.bar_style())
        }
    }
}

/// Flag, then config (file or env), then the built-in questionnaire
fn load_catalog(cli: &Cli, config: &UserConfig) -> Result<Catalog> {
    let wrap_width = config.wrap_width();
    match cli.catalog.as_deref().or(config.catalog_path()) {
        Some(path) => {
            debug!("Loading questionnaire from {}", path.display());
            Catalog::load_file(path, wrap_width).context("Failed to load questionnaire")
        }
        None => Catalog::embedded(wrap_width).context("Built-in questionnaire is invalid"),
    }
}

fn resolve_store_path(cli: &Cli, config: &UserConfig) -> Option<PathBuf> {
    cli.store.clone().or_else(|| config.store_path())
}

fn open_store(cli: &Cli, config: &UserConfig) -> Result<Arc<dyn UserStore>> {
    if cli.ephemeral {
        info!("Using an in-memory score store, results will not be kept");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = resolve_store_path(cli, config).ok_or_else(|| {
        anyhow::anyhow!("Could not determine a data directory, pass --store or set {STORE_ENV}")
    })?;
    let sheet = SheetStore::open(&path)
        .with_context(|| format!("Failed to open score sheet {}", path.display()))?;
    Ok(Arc::new(sheet))
}

fn run_config_action(action: &ConfigAction, cli: &Cli, config: &UserConfig) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("{} Config initialized at: {}", style("✓").green(), path.display());
            println!("\nEdit it to change where results are stored:");
            println!("  {}", path.display());
            println!("\nOr set via environment:");
            println!("  export {STORE_ENV}=\"/path/to/scores.redb\"");
            println!("  export {CATALOG_ENV}=\"/path/to/questionnaire.json\"");
            Ok(())
        }
        ConfigAction::Show => show_config(cli, config),
    }
}

fn show_config(cli: &Cli, config: &UserConfig) -> Result<()> {
    println!("{}", style("Config paths:").bold());
    if let Some(user_path) = UserConfig::user_config_path() {
        let status = if user_path.exists() {
            style("✓").green().to_string()
        } else {
            style("(not found)").dim().to_string()
        };
        println!("  User:    {} {}", user_path.display(), status);
    }
    println!();

    println!("{}", style("Store:").bold());
    match (cli.ephemeral, resolve_store_path(cli, config)) {
        (true, _) => println!("  in memory (--ephemeral)"),
        (false, Some(path)) => println!("  {}", path.display()),
        (false, None) => println!("  {}", style("no data directory").yellow()),
    }

    println!("{}", style("Questionnaire:").bold());
    match cli.catalog.as_deref().or(config.catalog_path()) {
        Some(path) => println!("  {}", path.display()),
        None => println!("  built-in"),
    }
    println!("  wrap width:     {}", config.wrap_width());

    let bar = config.bar_style();
    println!("{}", style("Display:").bold());
    println!("  bar width:      {}", bar.width);
    println!("  risk threshold: {}", bar.risk_threshold);
    println!("  scale limit:    {}", bar.scale_limit);
    println!("  scale divisor:  {}", bar.scale_divisor);
    Ok(())
}
