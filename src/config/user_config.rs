//! User-level configuration for co2score
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/co2score/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::catalog::wrap;
use crate::reporters::bar::BarStyle;

/// Overrides `[store] path`
pub const STORE_ENV: &str = "CO2SCORE_STORE";
/// Overrides `[catalog] path`
pub const CATALOG_ENV: &str = "CO2SCORE_CATALOG";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Score sheet file (default: <data dir>/co2score/scores.redb)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Questionnaire JSON file (default: the built-in questionnaire)
    pub path: Option<PathBuf>,

    /// Column at which questionnaire text is wrapped
    pub wrap_width: Option<usize>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub bar_width: Option<usize>,
    pub risk_threshold: Option<f64>,
    pub scale_limit: Option<f64>,
    pub scale_divisor: Option<f64>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/co2score/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            match Self::from_file(&path) {
                Ok(user_config) => config.merge(user_config),
                Err(e) => warn!("Ignoring unreadable config {}: {:#}", path.display(), e),
            }
        }

        // Environment variables override everything
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Parse one TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("co2score").join("config.toml"))
    }

    /// Where the score sheet lives when nothing is configured
    pub fn default_store_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("co2score").join("scores.redb"))
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(STORE_ENV).filter(|v| !v.is_empty()) {
            self.store.path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(CATALOG_ENV).filter(|v| !v.is_empty()) {
            self.catalog.path = Some(PathBuf::from(path));
        }
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.store.path.is_some() {
            self.store.path = other.store.path;
        }
        if other.catalog.path.is_some() {
            self.catalog.path = other.catalog.path;
        }
        if other.catalog.wrap_width.is_some() {
            self.catalog.wrap_width = other.catalog.wrap_width;
        }
        if other.display.bar_width.is_some() {
            self.display.bar_width = other.display.bar_width;
        }
        if other.display.risk_threshold.is_some() {
            self.display.risk_threshold = other.display.risk_threshold;
        }
        if other.display.scale_limit.is_some() {
            self.display.scale_limit = other.display.scale_limit;
        }
        if other.display.scale_divisor.is_some() {
            self.display.scale_divisor = other.display.scale_divisor;
        }
    }

    /// Configured or default score sheet path
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store.path.clone().or_else(Self::default_store_path)
    }

    /// Configured questionnaire file, if any
    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog.path.as_deref()
    }

    pub fn wrap_width(&self) -> usize {
        self.catalog.wrap_width.unwrap_or(wrap::WIDE)
    }

    /// Bar geometry with configured values over the defaults
    pub fn bar_style(&self) -> BarStyle {
        let defaults = BarStyle::default();
        BarStyle {
            width: self.display.bar_width.unwrap_or(defaults.width),
            risk_threshold: self
                .display
                .risk_threshold
                .unwrap_or(defaults.risk_threshold),
            scale_limit: self.display.scale_limit.unwrap_or(defaults.scale_limit),
            scale_divisor: self
                .display
                .scale_divisor
                .unwrap_or(defaults.scale_divisor),
        }
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::write_example(&config_path)?;
        Ok(config_path)
    }

    /// Write the commented example config unless `path` already exists
    pub fn write_example(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !path.exists() {
            let example = r#"# co2score user configuration

[store]
# Score sheet holding stored results
# path = "/home/me/.local/share/co2score/scores.redb"

[catalog]
# Questionnaire table as JSON rows; the built-in questionnaire is used when unset
# path = "/home/me/questionnaire.json"
# wrap_width = 70

[display]
# bar_width = 55
# Filled cells turn red above this score
# risk_threshold = 60.0
# Maxima above scale_limit are divided by scale_divisor before drawing
# scale_limit = 55.0
# scale_divisor = 4.0
"#;
            std::fs::write(path, example)?;
        }
        Ok(())
    }
}
