//! DART OpenAPI session
//!
//! A [`DartSession`] owns the credentials, the HTTP client and the retry
//! policy. Adapters borrow it; nothing is global.
//!
//! # Features
//!
//! - Blocking HTTP, one request at a time
//! - Retry with exponential backoff on transport errors, 5xx and 429
//! - The API key never appears in logs or error messages

use crate::error::{DartError, Result};
use capraise_domain::FactDate;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAPI endpoint
pub const DEFAULT_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// Default timeout for one request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection settings for DART
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DartConfig {
    /// Base URL of the OpenAPI
    pub base_url: String,

    /// API key; never written back to configuration files
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Timeout per request (seconds)
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    pub max_retries: u32,

    /// First backoff delay (milliseconds), doubled after every attempt
    pub backoff_ms: u64,

    /// Directory page size (DART caps it at 100)
    pub page_count: u32,
}

impl DartConfig {
    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url must be an http(s) URL: {}", self.base_url));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        if self.page_count == 0 || self.page_count > 100 {
            return Err("page_count must be between 1 and 100".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string, without the API key
    pub fn to_toml(&self) -> std::result::Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for DartConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_ms: 1_000,
            page_count: 100,
        }
    }
}

/// Credentials, HTTP client and retry policy shared by the adapters
pub struct DartSession {
    config: DartConfig,
    api_key: String,
    client: Client,
}

impl DartSession {
    /// Create a session; fails without an API key
    pub fn new(config: DartConfig) -> Result<Self> {
        config.validate().map_err(DartError::Config)?;
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(DartError::MissingApiKey)?
            .to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("capraise/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DartError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &DartConfig {
        &self.config
    }

    /// GET `endpoint` with `params`, returning the raw body
    pub(crate) fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.config.max_retries {
            let request = self
                .client
                .get(&url)
                .query(&[("crtfc_key", self.api_key.as_str())])
                .query(params);

            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.bytes().map_err(|e| {
                            DartError::Communication(format!("Failed to read {}: {}", endpoint, e.without_url()))
                        })?;
                        debug!("GET {} -> {} bytes", endpoint, body.len());
                        return Ok(body.to_vec());
                    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(DartError::Communication(format!("HTTP {} from {}", status, endpoint)));
                    } else {
                        return Err(DartError::Communication(format!("HTTP {} from {}", status, endpoint)));
                    }
                }
                Err(e) => {
                    last_error = Some(DartError::Communication(format!(
                        "Request to {} failed: {}",
                        endpoint,
                        e.without_url()
                    )));
                }
            }

            attempts += 1;
            if attempts < self.config.max_retries {
                // Exponential backoff: 1x, 2x, 4x the configured delay
                let delay = Duration::from_millis(self.config.backoff_ms.saturating_mul(1u64 << (attempts - 1).min(16)));
                warn!(
                    "Attempt {}/{} for {} failed, retrying in {:?}",
                    attempts, self.config.max_retries, endpoint, delay
                );
                std::thread::sleep(delay);
            }
        }

        Err(last_error.unwrap_or_else(|| DartError::Communication("Max retries exceeded".to_string())))
    }

    /// GET `endpoint` and decode the JSON body
    pub(crate) fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let body = self.get(endpoint, params)?;
        serde_json::from_slice(&body)
            .map_err(|e| DartError::InvalidResponse(format!("Failed to parse {}: {}", endpoint, e)))
    }
}

impl std::fmt::Debug for DartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DartSession")
            .field("base_url", &self.config.base_url)
            .field("max_retries", &self.config.max_retries)
            .finish_non_exhaustive()
    }
}

/// `YYYYMMDD`, the date format of every DART query parameter
pub(crate) fn compact_date(date: FactDate) -> String {
    date.to_string().replace('-', "")
}
