//! Configuration management for the CLI.
//!
//! One TOML file carries a section per component. The DART key may also
//! come from the environment so it never has to be written to disk.

use crate::error::{CliError, Result};
use capraise_dart::DartConfig;
use capraise_extractor::ExtractorConfig;
use capraise_reconciler::ReconcilerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the DART API key
pub const API_KEY_ENV: &str = "DART_API_KEY";

/// Environment variable overriding the database path
pub const DB_PATH_ENV: &str = "CAPRAISE_DB";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// DART OpenAPI connection
    #[serde(default)]
    pub dart: DartConfig,

    /// Extraction tunables
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Run settings
    #[serde(default)]
    pub reconciler: ReconcilerConfig,

    /// Local store
    #[serde(default)]
    pub store: StoreSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Days before today covered by `sync` when no start date is given
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".capraise").join("config.toml"))
    }

    /// Load configuration from `path`, or the defaults when it does not exist.
    ///
    /// Environment overrides are applied afterwards.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.dart.api_key = Some(key.trim().to_string());
        }
        if let Some(db) = lookup(DB_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            self.store.path = PathBuf::from(db);
        }
    }

    /// Save configuration to `path`.
    ///
    /// The API key is never written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.dart
            .validate()
            .map_err(|e| CliError::Config(format!("[dart] {}", e)))?;
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("[extractor] {}", e)))?;
        self.reconciler
            .validate()
            .map_err(|e| CliError::Config(format!("[reconciler] {}", e)))?;
        if self.settings.lookback_days == 0 {
            return Err(CliError::Config("[settings] lookback_days must be greater than 0".into()));
        }
        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            lookback_days: default_lookback_days(),
        }
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))
}

fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".capraise").join("capraise.db"))
        .unwrap_or_else(|| PathBuf::from("capraise.db"))
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_lookback_days() -> u32 {
    7
}
