//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates. Every call is
//! blocking; the pipeline processes one filing at a time.

use crate::category::{MarketSegment, ReportCategory};
use crate::fact::{Fact, FactDate};
use crate::filing::{DocumentArchive, FilingKey, TypedRecord};

/// Inclusive range of receipt dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day (inclusive)
    pub start: FactDate,
    /// Last day (inclusive)
    pub end: FactDate,
}

impl DateRange {
    /// Create a range, `None` when `start` is after `end`
    pub fn new(start: FactDate, end: FactDate) -> Option<Self> {
        if start > end {
            None
        } else {
            Some(Self { start, end })
        }
    }
}

/// One entry of the filing directory
#[derive(Debug, Clone, PartialEq)]
pub struct FilingSummary {
    /// Identity key
    pub key: FilingKey,
    /// Issuer name
    pub company_name: String,
    /// Market segment
    pub market: MarketSegment,
    /// Raw report title
    pub report_title: String,
    /// Issuer code for the detail endpoint
    pub issuer_code: String,
    /// Receipt date
    pub receipt_date: Fact<FactDate>,
}

/// One page of the filing directory
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilingPage {
    /// Filings on this page
    pub filings: Vec<FilingSummary>,
    /// 1-based page number
    pub page: u32,
    /// Total number of pages reported by the directory
    pub total_pages: u32,
}

impl FilingPage {
    /// Whether a further page exists
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Trait for paging through the filing directory
///
/// Implemented by the infrastructure layer (capraise-dart)
pub trait FilingLocator {
    /// Error type for directory queries
    type Error;

    /// Fetch one page of filings received within `range`
    fn list_filings(&self, range: &DateRange, page: u32) -> Result<FilingPage, Self::Error>;
}

/// Trait for querying the category-specific detail endpoint
///
/// Implemented by the infrastructure layer (capraise-dart)
pub trait DetailFetcher {
    /// Error type for detail queries
    type Error;

    /// Every typed record the issuer filed for `category` within `range`
    fn fetch_details(
        &self,
        issuer_code: &str,
        category: ReportCategory,
        range: &DateRange,
    ) -> Result<Vec<TypedRecord>, Self::Error>;
}

/// Trait for downloading the document archive of a filing
///
/// Implemented by the infrastructure layer (capraise-dart)
pub trait DocumentRetriever {
    /// Error type for downloads
    type Error;

    /// Download the archive for `key`
    fn fetch_document(&self, key: &FilingKey) -> Result<DocumentArchive, Self::Error>;
}

/// Trait for the persisted tabular store
///
/// Tables are addressed by name; row 0 of every table is its header.
/// Implemented by the infrastructure layer (capraise-store)
pub trait SheetStore {
    /// Error type for store operations
    type Error;

    /// Create the table with `header` as row 0 if it does not exist
    fn ensure_table(&mut self, table: &str, header: &[String]) -> Result<(), Self::Error>;

    /// Every row of the table, header included
    fn read_rows(&self, table: &str) -> Result<Vec<Vec<String>>, Self::Error>;

    /// Append rows after the last row
    fn append_rows(&mut self, table: &str, rows: &[Vec<String>]) -> Result<(), Self::Error>;

    /// Replace the row at `position` (0 is the header)
    fn overwrite_row(&mut self, table: &str, position: usize, row: &[String]) -> Result<(), Self::Error>;
}
