//! Configuration for the field extractor

use serde::{Deserialize, Serialize};

/// Tunables of the two-tier extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Free-text look-ahead after a label (characters)
    pub window_chars: usize,

    /// Smallest amount accepted as a price (won)
    pub min_price: u64,

    /// Bare four-digit tokens in `[min_year, max_year]` are years, not prices
    pub min_year: u32,

    /// Upper bound of the plausible-year range
    pub max_year: u32,

    /// Largest plausible discount/premium magnitude (percent)
    pub max_rate_percent: u32,

    /// Longest stripped cell text still treated as a label (characters)
    pub max_label_chars: usize,

    /// Longest allottee snippet attached to an investor description
    pub investor_snippet_chars: usize,

    /// Look-ahead after the call-option phrase for the call ratio
    pub call_ratio_window_chars: usize,

    /// Look-ahead after the call yield phrase for the yield-to-call
    pub yield_to_call_window_chars: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window_chars == 0 {
            return Err("window_chars must be greater than 0".to_string());
        }
        if self.min_year > self.max_year {
            return Err("min_year cannot exceed max_year".to_string());
        }
        if self.max_year > 9999 {
            return Err("max_year must be a four-digit year".to_string());
        }
        if self.max_rate_percent == 0 {
            return Err("max_rate_percent must be greater than 0".to_string());
        }
        if self.max_label_chars == 0 {
            return Err("max_label_chars must be greater than 0".to_string());
        }
        if self.investor_snippet_chars == 0 {
            return Err("investor_snippet_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Strict preset: short windows, fewer but safer matches
    pub fn strict() -> Self {
        Self {
            window_chars: 200,
            min_price: 500,
            max_label_chars: 24,
            investor_snippet_chars: 40,
            ..Self::default()
        }
    }

    /// Lenient preset: long windows for verbose filings
    pub fn lenient() -> Self {
        Self {
            window_chars: 1_000,
            min_price: 10,
            max_label_chars: 60,
            investor_snippet_chars: 100,
            ..Self::default()
        }
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

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            window_chars: 500,
            min_price: 100,
            min_year: 1900,
            max_year: 2100,
            max_rate_percent: 100,
            max_label_chars: 40,
            investor_snippet_chars: 60,
            call_ratio_window_chars: 150,
            yield_to_call_window_chars: 50,
        }
    }
}
