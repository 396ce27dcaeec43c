//! In-process stand-in for DART, for tests and offline runs
//!
//! One [`MockDart`] implements all three adapter traits from fixtures held
//! behind an `Arc<Mutex<_>>`, so clones observe the same calls.

use crate::error::{DartError, Result};
use capraise_domain::{
    DateRange, DetailFetcher, DocumentArchive, DocumentRetriever, FilingKey, FilingLocator,
    FilingPage, FilingSummary, ReportCategory, TypedRecord,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MockState {
    pages: Vec<Vec<FilingSummary>>,
    details: HashMap<(String, ReportCategory), Vec<TypedRecord>>,
    documents: HashMap<FilingKey, DocumentArchive>,
    failing_pages: HashSet<u32>,
    failing_details: HashSet<String>,
    failing_documents: HashSet<FilingKey>,
    list_calls: usize,
    detail_calls: usize,
    document_calls: usize,
}

/// Fixture-backed directory, detail endpoint and document store
#[derive(Debug, Clone, Default)]
pub struct MockDart {
    state: Arc<Mutex<MockState>>,
}

impl MockDart {
    /// Create an empty mock: no filings, no details, no documents
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a directory page
    pub fn add_page(&self, filings: Vec<FilingSummary>) {
        self.state().pages.push(filings);
    }

    /// Register the detail records an issuer filed for a category
    pub fn add_details(&self, issuer_code: &str, category: ReportCategory, records: Vec<TypedRecord>) {
        self.state()
            .details
            .entry((issuer_code.to_string(), category))
            .or_default()
            .extend(records);
    }

    /// Register the document archive of a filing
    pub fn add_document(&self, key: FilingKey, archive: DocumentArchive) {
        self.state().documents.insert(key, archive);
    }

    /// Make a directory page fail
    pub fn fail_page(&self, page: u32) {
        self.state().failing_pages.insert(page);
    }

    /// Make every detail query for an issuer fail
    pub fn fail_details(&self, issuer_code: &str) {
        self.state().failing_details.insert(issuer_code.to_string());
    }

    /// Make the download of a filing fail
    pub fn fail_document(&self, key: FilingKey) {
        self.state().failing_documents.insert(key);
    }

    /// Number of directory calls
    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    /// Number of detail calls
    pub fn detail_calls(&self) -> usize {
        self.state().detail_calls
    }

    /// Number of document downloads
    pub fn document_calls(&self) -> usize {
        self.state().document_calls
    }
}

impl FilingLocator for MockDart {
    type Error = DartError;

    fn list_filings(&self, _range: &DateRange, page: u32) -> Result<FilingPage> {
        let mut state = self.state();
        state.list_calls += 1;
        if state.failing_pages.contains(&page) {
            return Err(DartError::Injected(format!("directory page {}", page)));
        }

        let total_pages = u32::try_from(state.pages.len()).unwrap_or(u32::MAX);
        let filings = page
            .checked_sub(1)
            .and_then(|index| state.pages.get(index as usize))
            .cloned()
            .unwrap_or_default();
        Ok(FilingPage {
            filings,
            page,
            total_pages,
        })
    }
}

impl DetailFetcher for MockDart {
    type Error = DartError;

    fn fetch_details(
        &self,
        issuer_code: &str,
        category: ReportCategory,
        _range: &DateRange,
    ) -> Result<Vec<TypedRecord>> {
        let mut state = self.state();
        state.detail_calls += 1;
        if state.failing_details.contains(issuer_code) {
            return Err(DartError::Injected(format!("details for {}", issuer_code)));
        }
        Ok(state
            .details
            .get(&(issuer_code.to_string(), category))
            .cloned()
            .unwrap_or_default())
    }
}

impl DocumentRetriever for MockDart {
    type Error = DartError;

    fn fetch_document(&self, key: &FilingKey) -> Result<DocumentArchive> {
        let mut state = self.state();
        state.document_calls += 1;
        if state.failing_documents.contains(key) {
            return Err(DartError::Injected(format!("document {}", key)));
        }
        state.documents.get(key).cloned().ok_or_else(|| DartError::Status {
            code: "014".to_string(),
            message: format!("no document for {}", key),
        })
    }
}
