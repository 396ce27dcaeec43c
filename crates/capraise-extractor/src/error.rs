//! Error types for the extractor
//!
//! These never escape [`FieldExtractor::extract`](crate::FieldExtractor::extract):
//! an unreadable container degrades to a `Malformed` extraction. They surface
//! from the lower-level helpers and from configuration loading.

use thiserror::Error;

/// Errors that can occur while reading a document container
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Container is neither a ZIP archive nor bare markup
    #[error("Unreadable archive: {0}")]
    Archive(String),

    /// A document could not be decoded as UTF-8 or EUC-KR
    #[error("Undecodable document {name}")]
    Encoding {
        /// Entry name inside the container
        name: String,
    },

    /// No document in the container carried usable markup
    #[error("No usable markup in {0} document(s)")]
    NoMarkup(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for ExtractorError {
    fn from(e: zip::result::ZipError) -> Self {
        ExtractorError::Archive(e.to_string())
    }
}

impl From<std::io::Error> for ExtractorError {
    fn from(e: std::io::Error) -> Self {
        ExtractorError::Archive(e.to_string())
    }
}
