//! Configuration for reconciliation runs

use capraise_domain::{ReportCategory, RowSchema, DEFAULT_SOURCE_LINK_BASE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for the run pipeline
///
/// Categories are named by their canonical string (`rights_issue`,
/// `convertible_bond`, `exchangeable_bond`) so the file stays readable.
///
/// # Examples
///
/// ```
/// use capraise_reconciler::ReconcilerConfig;
///
/// let config = ReconcilerConfig::from_toml(r#"
/// categories = ["convertible_bond"]
/// pacing_ms = 0
/// dry_run = true
/// "#).unwrap();
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.categories().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Categories to process, in order
    pub categories: Vec<String>,

    /// Delay before every external call after the first (milliseconds)
    pub pacing_ms: u64,

    /// Log decisions without writing filing rows
    pub dry_run: bool,

    /// Prefix of the source-document link; the receipt number is appended
    pub link_base: String,

    /// Store table per category, overriding the default names
    pub tables: BTreeMap<String, String>,

    /// Header labels per category, overriding the default labels
    pub headers: BTreeMap<String, Vec<String>>,
}

impl ReconcilerConfig {
    /// Categories in processing order
    pub fn categories(&self) -> Result<Vec<ReportCategory>, String> {
        self.categories
            .iter()
            .map(|name| {
                ReportCategory::parse(name).ok_or_else(|| format!("Unknown category: {}", name))
            })
            .collect()
    }

    /// Store table of a category
    pub fn table_for(&self, category: ReportCategory) -> &str {
        override_for(&self.tables, category)
            .map(String::as_str)
            .unwrap_or_else(|| category.default_table())
    }

    /// Row schema of a category, with header overrides applied
    pub fn schema_for(&self, category: ReportCategory) -> Result<RowSchema, String> {
        let schema = RowSchema::for_category(category);
        match override_for(&self.headers, category) {
            Some(labels) => schema.with_labels(labels.clone()),
            None => Ok(schema),
        }
    }

    /// Pacing delay as Duration
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let categories = self.categories()?;
        if categories.is_empty() {
            return Err("at least one category is required".to_string());
        }
        for (i, category) in categories.iter().enumerate() {
            if categories[..i].contains(category) {
                return Err(format!("Category listed twice: {}", category));
            }
        }

        for name in self.tables.keys().chain(self.headers.keys()) {
            if ReportCategory::parse(name).is_none() {
                return Err(format!("Unknown category in overrides: {}", name));
            }
        }
        for category in &categories {
            if self.table_for(*category).trim().is_empty() {
                return Err(format!("Table name for {} is empty", category));
            }
            self.schema_for(*category)?;
        }
        let mut tables: Vec<&str> = categories.iter().map(|c| self.table_for(*c)).collect();
        tables.sort_unstable();
        if tables.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err("Two categories share a store table".to_string());
        }

        if self.pacing_ms > 60_000 {
            return Err("pacing_ms must not exceed 60000".to_string());
        }
        if self.link_base.trim().is_empty() {
            return Err("link_base must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// Override entry whose key names `category` in any accepted spelling
fn override_for<V>(map: &BTreeMap<String, V>, category: ReportCategory) -> Option<&V> {
    map.iter()
        .find(|(name, _)| ReportCategory::parse(name) == Some(category))
        .map(|(_, value)| value)
}

impl Default for ReconcilerConfig {
    /// Every category, DART's published pacing of 1 second between calls
    fn default() -> Self {
        Self {
            categories: ReportCategory::ALL
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            pacing_ms: 1_000,
            dry_run: false,
            link_base: DEFAULT_SOURCE_LINK_BASE.to_string(),
            tables: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }
}
