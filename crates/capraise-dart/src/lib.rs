//! Capraise DART Adapters
//!
//! Implementations of the filing-directory, detail and document traits from
//! `capraise-domain` on the DART OpenAPI.
//!
//! # Architecture
//!
//! A [`DartSession`] owns the API key, the blocking HTTP client and the
//! retry policy. Each adapter borrows the session:
//!
//! - [`DartLocator`]: `list.json` paging
//! - [`DartDetailFetcher`]: `piicDecsn`/`cvbdIsDecsn`/`exbdIsDecsn`
//! - [`DartDocumentRetriever`]: `document.xml` archives
//!
//! [`MockDart`] implements all three traits from in-memory fixtures.
//!
//! # Examples
//!
//! ```
//! use capraise_dart::{DartConfig, DartError, DartSession};
//!
//! // A session cannot exist without credentials
//! let result = DartSession::new(DartConfig::default());
//! assert!(matches!(result, Err(DartError::MissingApiKey)));
//! ```

#![warn(missing_docs)]

pub mod detail;
mod document;
mod error;
mod list;
mod mock;
mod session;

pub use detail::DartDetailFetcher;
pub use document::DartDocumentRetriever;
pub use error::{DartError, Result};
pub use list::DartLocator;
pub use mock::MockDart;
pub use session::{DartConfig, DartSession, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};

/// Status of a successful response
pub const STATUS_OK: &str = "000";

/// Status of a query that matched nothing
pub const STATUS_NO_DATA: &str = "013";
