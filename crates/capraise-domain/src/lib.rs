//! Capraise Domain Layer
//!
//! This crate contains the domain model shared by every other Capraise crate:
//! the typed facts recovered from capital-raising disclosures, the row schema
//! they are projected onto, and the trait seams for every external
//! collaborator (filing directory, detail endpoint, document archive, store).
//!
//! ## Key Concepts
//!
//! - **Fact**: a value that is either validated (`Known`) or explicitly `Unknown`
//! - **Filing**: one disclosure, identified by its receipt number ([`FilingKey`])
//! - **Typed facts**: machine-provided fields from the detail endpoint
//! - **Extracted facts**: fields only recoverable from the document body
//! - **Row schema**: fixed, positional column layout per report category
//!
//! ## Architecture
//!
//! - Pure domain logic, the only external crate is `chrono` for calendar dates
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod fact;
pub mod filing;
pub mod record;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use category::{MarketSegment, ReportCategory};
pub use fact::{Fact, FactDate, Money, Percent, Presence, Sign, SignedRate, UNKNOWN_MARKER};
pub use filing::{
    BondOptions, BondTerms, DocumentArchive, ExtractedFacts, FilingKey, FilingMetadata,
    FundingPurposes, Investor, RightsIssueTerms, TypedFacts, TypedRecord, SEE_SOURCE_MARKER,
};
pub use record::{FilingRecord, Row, DEFAULT_SOURCE_LINK_BASE};
pub use schema::{Column, RowSchema};
pub use traits::{
    DateRange, DetailFetcher, DocumentRetriever, FilingLocator, FilingPage, FilingSummary,
    SheetStore,
};
