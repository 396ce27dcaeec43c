//! Capraise Extractor
//!
//! Recovers the facts that only the document body carries (prices, dates, a
//! signed discount/premium rate, investor description, bond options) from
//! the markup documents of one filing.
//!
//! # Overview
//!
//! Filings are human-oriented documents with no fixed grammar: the same
//! field shows up in a two-column table, in a wide table with a share-class
//! column, or only in running text. The engine therefore runs an explicit
//! two-tier strategy per field, driven by a declarative label table
//! ([`LABEL_PATTERNS`]):
//!
//! ```text
//! archive → unpack → markup → { table rows, full text }
//!         → per field: structural same-row scan → free-text window
//!         → per-type validation → ExtractedFacts
//! ```
//!
//! A field is only ever populated from a validated token. Undetermined
//! phrases, implausible magnitudes and contradicting signs all come out as
//! [`Fact::Unknown`](capraise_domain::Fact).
//!
//! # Example Usage
//!
//! ```
//! use capraise_domain::{DocumentArchive, ReportCategory};
//! use capraise_extractor::{ExtractorConfig, FieldExtractor};
//!
//! let extractor = FieldExtractor::new(ExtractorConfig::default()).unwrap();
//! let markup = "<table><tr><td>기준주가</td><td>10,000</td></tr>\
//!               <tr><td>확정발행가액</td><td>9,200</td></tr></table>";
//! let extraction = extractor.extract(
//!     &DocumentArchive::new(markup.as_bytes().to_vec()),
//!     ReportCategory::RightsIssue,
//!     None,
//! );
//!
//! assert_eq!(extraction.facts.issue_price.cell(), "9,200");
//! assert_eq!(extraction.facts.reference_price.cell(), "10,000");
//! ```

#![warn(missing_docs)]

mod archive;
mod config;
mod engine;
mod error;
mod investor;
mod markup;
mod normalize;
mod options;
mod patterns;

#[cfg(test)]
mod tests;

pub use archive::{decode, unpack, MarkupDocument};
pub use config::ExtractorConfig;
pub use engine::{Extraction, ExtractionStatus, FieldExtractor};
pub use error::ExtractorError;
pub use normalize::{normalize_text, Resolution};
pub use patterns::{FieldKind, LabelPattern, LabelTable, LABEL_PATTERNS};
