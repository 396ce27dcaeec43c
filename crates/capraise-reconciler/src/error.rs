//! Error types for reconciliation runs
//!
//! Only failures that stop a whole category are errors. Per-filing problems
//! (missing detail, failed download, failed write) are recorded as outcomes
//! and the run continues.

use thiserror::Error;

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum ReconcilerError {
    /// The store could not be prepared or read at the start of a category
    #[error("Storage error: {0}")]
    Store(String),

    /// The filing directory could not be paged
    #[error("Directory error: {0}")]
    Locator(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for reconciliation runs
pub type Result<T> = std::result::Result<T, ReconcilerError>;
