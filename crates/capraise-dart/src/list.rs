//! Filing directory (`list.json`)

use crate::error::{DartError, Result};
use crate::session::{compact_date, DartSession};
use crate::{STATUS_NO_DATA, STATUS_OK};
use capraise_domain::{
    DateRange, FilingKey, FilingLocator, FilingPage, FilingSummary, MarketSegment,
};
use serde::Deserialize;
use tracing::{debug, warn};

/// Response of `list.json`
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    page_no: u32,
    #[serde(default)]
    total_page: u32,
    #[serde(default)]
    list: Vec<ListEntry>,
}

/// One entry of the directory
#[derive(Debug, Deserialize)]
pub(crate) struct ListEntry {
    #[serde(default)]
    corp_cls: String,
    #[serde(default)]
    corp_name: String,
    #[serde(default)]
    corp_code: String,
    #[serde(default)]
    report_nm: String,
    #[serde(default)]
    rcept_no: String,
    #[serde(default)]
    rcept_dt: String,
}

impl ListResponse {
    /// Convert into a page; `013` (no data) is an empty last page
    pub(crate) fn into_page(self, requested: u32) -> Result<FilingPage> {
        match self.status.as_str() {
            STATUS_OK => {}
            STATUS_NO_DATA => {
                return Ok(FilingPage {
                    filings: Vec::new(),
                    page: requested,
                    total_pages: 0,
                })
            }
            _ => {
                return Err(DartError::Status {
                    code: self.status,
                    message: self.message,
                })
            }
        }

        let filings = self
            .list
            .into_iter()
            .filter_map(|entry| match entry.into_summary() {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Skipping directory entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(FilingPage {
            filings,
            page: if self.page_no == 0 { requested } else { self.page_no },
            total_pages: self.total_page,
        })
    }
}

impl ListEntry {
    fn into_summary(self) -> std::result::Result<FilingSummary, String> {
        let key = FilingKey::new(&self.rcept_no)?;
        Ok(FilingSummary {
            key,
            company_name: self.corp_name.trim().to_string(),
            market: MarketSegment::from_code(&self.corp_cls),
            report_title: self.report_nm.trim().to_string(),
            issuer_code: self.corp_code.trim().to_string(),
            receipt_date: crate::detail::parse_date(&self.rcept_dt),
        })
    }
}

/// [`FilingLocator`] over the DART directory of major-event reports
#[derive(Debug)]
pub struct DartLocator<'a> {
    session: &'a DartSession,
}

impl<'a> DartLocator<'a> {
    /// Create a locator on `session`
    pub fn new(session: &'a DartSession) -> Self {
        Self { session }
    }
}

impl FilingLocator for DartLocator<'_> {
    type Error = DartError;

    fn list_filings(&self, range: &DateRange, page: u32) -> Result<FilingPage> {
        let bgn_de = compact_date(range.start);
        let end_de = compact_date(range.end);
        let page_no = page.to_string();
        let page_count = self.session.config().page_count.to_string();

        let response: ListResponse = self.session.get_json(
            "list.json",
            &[
                ("bgn_de", bgn_de.as_str()),
                ("end_de", end_de.as_str()),
                ("pblntf_ty", "B"),
                ("pblntf_detail_ty", "B001"),
                ("last_reprt_at", "Y"),
                ("page_no", page_no.as_str()),
                ("page_count", page_count.as_str()),
            ],
        )?;
        let page = response.into_page(page)?;
        debug!(
            "Directory page {}/{}: {} filings",
            page.page,
            page.total_pages,
            page.filings.len()
        );
        Ok(page)
    }
}
