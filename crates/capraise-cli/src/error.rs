//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// DART error
    #[error("DART error: {0}")]
    Dart(#[from] capraise_dart::DartError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] capraise_store::StoreError),

    /// Reconciliation error
    #[error("Reconciliation error: {0}")]
    Reconciler(#[from] capraise_reconciler::ReconcilerError),

    /// Extractor error
    #[error("Extractor error: {0}")]
    Extractor(#[from] capraise_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
