//! Capraise Reconciler
//!
//! Merges freshly computed filing records into the persisted store without
//! duplicating rows or destroying previously correct data.
//!
//! # Overview
//!
//! For every filing the reconciler makes one decision:
//!
//! | Stored? | Cells after healing | Decision |
//! |---------|---------------------|----------|
//! | no | n/a | **Append** |
//! | yes | some cell differs | **Overwrite** in place |
//! | yes | all identical | **Skip** |
//!
//! Healing merges the fresh row with the stored one first: a fresh unknown
//! marker never replaces a stored value, and a "see source" placeholder
//! never replaces a specific one. A derived cell such as the discount rate
//! is carried only while the prices it comes from are unchanged. Incomplete
//! rows fill in over later runs and re-running is a no-op.
//!
//! # Usage
//!
//! ```no_run
//! use capraise_dart::{DartConfig, DartDetailFetcher, DartDocumentRetriever, DartLocator, DartSession};
//! use capraise_domain::{DateRange, FactDate};
//! use capraise_extractor::{ExtractorConfig, FieldExtractor};
//! use capraise_reconciler::{Pipeline, ReconcilerConfig};
//! use capraise_store::SqliteSheetStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = DartSession::new(DartConfig {
//!     api_key: Some("your-api-key".to_string()),
//!     ..Default::default()
//! })?;
//! let mut pipeline = Pipeline::new(
//!     ReconcilerConfig::default(),
//!     FieldExtractor::new(ExtractorConfig::default())?,
//!     DartLocator::new(&session),
//!     DartDetailFetcher::new(&session),
//!     DartDocumentRetriever::new(&session),
//!     SqliteSheetStore::new("capraise.db")?,
//! )?;
//!
//! let range = DateRange::new(
//!     FactDate::from_ymd(2024, 3, 1).unwrap(),
//!     FactDate::from_ymd(2024, 3, 8).unwrap(),
//! ).unwrap();
//! let report = pipeline.run(&range)?;
//! println!("{}", report.metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! categories = ["rights_issue", "convertible_bond", "exchangeable_bond"]
//! pacing_ms = 1000
//! dry_run = false
//! link_base = "https://dart.fss.or.kr/dsaf001/main.do?rcpNo="
//!
//! [tables]
//! convertible_bond = "CB"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod index;
mod metrics;
mod pipeline;
mod reconciler;

pub use config::ReconcilerConfig;
pub use error::{ReconcilerError, Result};
pub use index::PersistedIndex;
pub use metrics::{CategoryMetrics, ReconcilerMetrics};
pub use pipeline::{FilingOutcome, Outcome, Pipeline, RunReport};
pub use reconciler::{heal, reconcile, rows_equal, Decision, DerivedCell, Reconciliation};
