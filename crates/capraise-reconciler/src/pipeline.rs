//! The run pipeline
//!
//! One run walks the configured categories in order. Per category:
//!
//! 1. Ensure the table exists and index every stored row
//! 2. Page the directory and keep filings of the category
//! 3. Per filing: detail record → document → extraction → row → decision
//! 4. Write the decision immediately and keep the index current
//!
//! Only the store preparation and the directory are fatal; every per-filing
//! failure defers that filing to a later run.

use crate::config::ReconcilerConfig;
use crate::error::{ReconcilerError, Result};
use crate::index::PersistedIndex;
use crate::metrics::ReconcilerMetrics;
use crate::reconciler::{reconcile, Decision, DerivedCell};
use capraise_domain::{
    DateRange, DetailFetcher, DocumentRetriever, FilingKey, FilingLocator, FilingMetadata,
    FilingRecord, FilingSummary, ReportCategory, RowSchema, SheetStore, TypedRecord,
};
use capraise_extractor::FieldExtractor;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What happened to one filing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Appended as a new row
    Appended,
    /// Stored row rewritten
    Overwritten,
    /// Stored row already current
    Skipped,
    /// Left for a later run
    Deferred(String),
    /// The store rejected the write
    WriteFailed(String),
}

impl Outcome {
    fn from_decision(decision: Decision) -> Self {
        match decision {
            Decision::Append => Outcome::Appended,
            Decision::Overwrite { .. } => Outcome::Overwritten,
            Decision::Skip { .. } => Outcome::Skipped,
        }
    }

    /// Short label for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Appended => "appended",
            Outcome::Overwritten => "overwritten",
            Outcome::Skipped => "skipped",
            Outcome::Deferred(_) => "deferred",
            Outcome::WriteFailed(_) => "write failed",
        }
    }
}

/// Outcome of one filing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingOutcome {
    /// Category the filing was processed under
    pub category: ReportCategory,
    /// Identity key
    pub key: FilingKey,
    /// Issuer name
    pub company_name: String,
    /// What happened
    pub outcome: Outcome,
}

/// Everything a run did
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Time-ordered run identifier
    pub run_id: Uuid,
    /// Whether writes were suppressed
    pub dry_run: bool,
    /// Counters per category
    pub metrics: ReconcilerMetrics,
    /// Per-filing outcomes, in processing order
    pub outcomes: Vec<FilingOutcome>,
}

/// Result of processing one filing
#[derive(Debug)]
struct Processed {
    outcome: Outcome,
    malformed: bool,
}

impl Processed {
    fn deferred(reason: String) -> Self {
        Self {
            outcome: Outcome::Deferred(reason),
            malformed: false,
        }
    }
}

/// Inserts the configured delay before every external call after the first
#[derive(Debug)]
struct Pacer {
    delay: std::time::Duration,
    calls: usize,
}

impl Pacer {
    fn pace(&mut self) {
        if self.calls > 0 && !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.calls += 1;
    }
}

/// Drives the collaborators through one reconciliation run
///
/// # Examples
///
/// ```
/// use capraise_dart::MockDart;
/// use capraise_domain::{DateRange, FactDate};
/// use capraise_extractor::{ExtractorConfig, FieldExtractor};
/// use capraise_reconciler::{Pipeline, ReconcilerConfig};
/// use capraise_store::MemorySheetStore;
///
/// let dart = MockDart::new();
/// let config = ReconcilerConfig { pacing_ms: 0, ..Default::default() };
/// let extractor = FieldExtractor::new(ExtractorConfig::default()).unwrap();
/// let mut pipeline = Pipeline::new(
///     config, extractor, dart.clone(), dart.clone(), dart, MemorySheetStore::new(),
/// ).unwrap();
///
/// let day = FactDate::from_ymd(2024, 3, 5).unwrap();
/// let report = pipeline.run(&DateRange::new(day, day).unwrap()).unwrap();
/// assert!(report.outcomes.is_empty());
/// ```
pub struct Pipeline<L, D, R, S> {
    config: ReconcilerConfig,
    categories: Vec<ReportCategory>,
    extractor: FieldExtractor,
    locator: L,
    details: D,
    documents: R,
    store: S,
    pacer: Pacer,
}

impl<L, D, R, S> Pipeline<L, D, R, S>
where
    L: FilingLocator,
    L::Error: Display,
    D: DetailFetcher,
    D::Error: Display,
    R: DocumentRetriever,
    R::Error: Display,
    S: SheetStore,
    S::Error: Display,
{
    /// Create a pipeline, validating the configuration
    pub fn new(
        config: ReconcilerConfig,
        extractor: FieldExtractor,
        locator: L,
        details: D,
        documents: R,
        store: S,
    ) -> Result<Self> {
        config.validate().map_err(ReconcilerError::Config)?;
        let categories = config.categories().map_err(ReconcilerError::Config)?;
        let pacer = Pacer {
            delay: config.pacing(),
            calls: 0,
        };
        Ok(Self {
            config,
            categories,
            extractor,
            locator,
            details,
            documents,
            store,
            pacer,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// The store the pipeline writes to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the pipeline and return the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Run every configured category over `range`
    pub fn run(&mut self, range: &DateRange) -> Result<RunReport> {
        let started = Instant::now();
        let run_id = Uuid::now_v7();
        info!(
            "Run {} over {}..{}{}",
            run_id,
            range.start,
            range.end,
            if self.config.dry_run { " (dry run)" } else { "" }
        );

        let mut metrics = ReconcilerMetrics::new();
        let mut outcomes = Vec::new();
        for category in self.categories.clone() {
            self.run_category(category, range, &mut metrics, &mut outcomes)?;
        }

        metrics.runtime_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "Run {} finished: {} written, {} deferred in {}ms",
            run_id,
            metrics.total_written(),
            metrics.totals().deferred,
            metrics.runtime_ms
        );

        Ok(RunReport {
            run_id,
            dry_run: self.config.dry_run,
            metrics,
            outcomes,
        })
    }

    fn run_category(
        &mut self,
        category: ReportCategory,
        range: &DateRange,
        metrics: &mut ReconcilerMetrics,
        outcomes: &mut Vec<FilingOutcome>,
    ) -> Result<()> {
        let schema = self
            .config
            .schema_for(category)
            .map_err(ReconcilerError::Config)?;
        let table = self.config.table_for(category).to_string();

        self.store
            .ensure_table(&table, &schema.header())
            .map_err(|e| ReconcilerError::Store(format!("Failed to prepare {}: {}", table, e)))?;
        let rows = self
            .store
            .read_rows(&table)
            .map_err(|e| ReconcilerError::Store(format!("Failed to read {}: {}", table, e)))?;
        let mut index = PersistedIndex::from_rows(rows, schema.key_position());
        debug!("{}: {} stored filings in {}", category, index.len(), table);

        let filings = self.list_category(category, range)?;
        metrics.category(category).seen += filings.len();
        info!("{}: {} filings in range", category, filings.len());

        let mut detail_cache: HashMap<String, Option<Vec<TypedRecord>>> = HashMap::new();
        for filing in filings {
            let processed = self.process_filing(
                category,
                &filing,
                range,
                &schema,
                &table,
                &mut index,
                &mut detail_cache,
            );

            let counters = metrics.category(category);
            if processed.malformed {
                counters.malformed += 1;
            }
            match &processed.outcome {
                Outcome::Appended => counters.appended += 1,
                Outcome::Overwritten => counters.overwritten += 1,
                Outcome::Skipped => counters.skipped += 1,
                Outcome::Deferred(_) => counters.deferred += 1,
                Outcome::WriteFailed(_) => counters.failed_writes += 1,
            }
            let outcome = processed.outcome;
            if let Outcome::Deferred(reason) | Outcome::WriteFailed(reason) = &outcome {
                warn!("{} {} {}: {}", category, filing.key, outcome.label(), reason);
            } else {
                debug!("{} {} {}", category, filing.key, outcome.label());
            }
            outcomes.push(FilingOutcome {
                category,
                key: filing.key,
                company_name: filing.company_name,
                outcome,
            });
        }

        let m = metrics.get(category);
        info!(
            "{}: appended {}, overwritten {}, skipped {}, deferred {}",
            category, m.appended, m.overwritten, m.skipped, m.deferred
        );
        Ok(())
    }

    /// Every filing of `category` in range, first occurrence of each key
    fn list_category(&mut self, category: ReportCategory, range: &DateRange) -> Result<Vec<FilingSummary>> {
        let mut filings = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1;
        loop {
            self.pacer.pace();
            let listing = self
                .locator
                .list_filings(range, page)
                .map_err(|e| ReconcilerError::Locator(format!("page {}: {}", page, e)))?;

            for filing in &listing.filings {
                if ReportCategory::from_title(&filing.report_title) != Some(category) {
                    continue;
                }
                if seen.insert(filing.key.clone()) {
                    filings.push(filing.clone());
                } else {
                    debug!("Skipping repeated filing {}", filing.key);
                }
            }

            if !listing.has_more() {
                break;
            }
            page += 1;
        }
        Ok(filings)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_filing(
        &mut self,
        category: ReportCategory,
        filing: &FilingSummary,
        range: &DateRange,
        schema: &RowSchema,
        table: &str,
        index: &mut PersistedIndex,
        detail_cache: &mut HashMap<String, Option<Vec<TypedRecord>>>,
    ) -> Processed {
        if !detail_cache.contains_key(&filing.issuer_code) {
            self.pacer.pace();
            let fetched = match self.details.fetch_details(&filing.issuer_code, category, range) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!("Detail query for issuer {} failed: {}", filing.issuer_code, e);
                    None
                }
            };
            detail_cache.insert(filing.issuer_code.clone(), fetched);
        }
        let typed = match detail_cache.get(&filing.issuer_code) {
            Some(Some(records)) => records.iter().find(|r| r.key == filing.key).cloned(),
            _ => return Processed::deferred("detail query failed".to_string()),
        };
        let Some(typed) = typed else {
            return Processed::deferred("no detail record for the filing".to_string());
        };

        self.pacer.pace();
        let archive = match self.documents.fetch_document(&filing.key) {
            Ok(archive) => archive,
            Err(e) => return Processed::deferred(format!("document download failed: {}", e)),
        };
        let extraction = self.extractor.extract(&archive, category, Some(&filing.key));
        let malformed = extraction.is_malformed();
        if malformed {
            warn!("{}: unreadable document, persisting typed facts only", filing.key);
        }

        let record = FilingRecord {
            metadata: FilingMetadata {
                key: filing.key.clone(),
                company_name: filing.company_name.clone(),
                market: filing.market,
                category,
                report_title: filing.report_title.clone(),
                issuer_code: filing.issuer_code.clone(),
                receipt_date: filing.receipt_date,
            },
            typed: typed.facts,
            extracted: extraction.facts,
        };
        let fresh = record.to_row_with(schema, &self.config.link_base);
        let reconciliation = reconcile(index, &filing.key, fresh, &DerivedCell::for_schema(schema));
        let decision = reconciliation.decision;

        if self.config.dry_run {
            info!("[dry run] {} {} would be {}", category, filing.key, Outcome::from_decision(decision).label());
        } else {
            let written = match decision {
                Decision::Append => self.store.append_rows(table, &[reconciliation.row.clone()]),
                Decision::Overwrite { position } => {
                    self.store.overwrite_row(table, position, &reconciliation.row)
                }
                Decision::Skip { .. } => Ok(()),
            };
            if let Err(e) = written {
                return Processed {
                    outcome: Outcome::WriteFailed(e.to_string()),
                    malformed,
                };
            }
        }

        match decision {
            Decision::Append => {
                index.record_append(filing.key.clone(), reconciliation.row);
            }
            Decision::Overwrite { position } => index.record_overwrite(position, reconciliation.row),
            Decision::Skip { .. } => {}
        }
        Processed {
            outcome: Outcome::from_decision(decision),
            malformed,
        }
    }
}
