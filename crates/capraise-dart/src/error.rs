//! Error types for the DART adapters

use thiserror::Error;

/// Errors that can occur while talking to DART
#[derive(Error, Debug)]
pub enum DartError {
    /// Network or HTTP-level failure after all retries
    #[error("Communication error: {0}")]
    Communication(String),

    /// DART answered with a non-success status code
    #[error("DART status {code}: {message}")]
    Status {
        /// Three-digit DART status code
        code: String,
        /// Message accompanying the status
        message: String,
    },

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No API key configured
    #[error("Missing DART API key (set DART_API_KEY)")]
    MissingApiKey,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure injected by a test double
    #[error("Injected failure: {0}")]
    Injected(String),
}

/// Result type for DART operations
pub type Result<T> = std::result::Result<T, DartError>;
