//! Metrics collected during a run

use capraise_domain::ReportCategory;
use std::collections::BTreeMap;

/// Counters for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryMetrics {
    /// Filings matching the category in the directory
    pub seen: usize,
    /// New rows appended
    pub appended: usize,
    /// Stored rows rewritten
    pub overwritten: usize,
    /// Stored rows already up to date
    pub skipped: usize,
    /// Filings left for a later run
    pub deferred: usize,
    /// Writes the store rejected
    pub failed_writes: usize,
    /// Documents that could not be read (typed facts still persisted)
    pub malformed: usize,
}

/// Metrics collected during one run, per category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilerMetrics {
    /// Counters per category
    pub categories: BTreeMap<ReportCategory, CategoryMetrics>,

    /// Wall-clock runtime in milliseconds
    pub runtime_ms: u64,
}

impl ReconcilerMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable counters of a category
    pub fn category(&mut self, category: ReportCategory) -> &mut CategoryMetrics {
        self.categories.entry(category).or_default()
    }

    /// Counters of a category, zero when nothing was recorded
    pub fn get(&self, category: ReportCategory) -> CategoryMetrics {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    /// Sum over every category
    pub fn totals(&self) -> CategoryMetrics {
        self.categories
            .values()
            .fold(CategoryMetrics::default(), |acc, m| CategoryMetrics {
                seen: acc.seen + m.seen,
                appended: acc.appended + m.appended,
                overwritten: acc.overwritten + m.overwritten,
                skipped: acc.skipped + m.skipped,
                deferred: acc.deferred + m.deferred,
                failed_writes: acc.failed_writes + m.failed_writes,
                malformed: acc.malformed + m.malformed,
            })
    }

    /// Number of rows written (appended or overwritten)
    pub fn total_written(&self) -> usize {
        let totals = self.totals();
        totals.appended + totals.overwritten
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Reconciliation Summary".to_string(),
            "======================".to_string(),
            format!("Runtime: {}ms", self.runtime_ms),
            String::new(),
        ];

        for (category, m) in &self.categories {
            lines.push(format!("{}:", category));
            lines.push(format!(
                "  seen {}, appended {}, overwritten {}, skipped {}",
                m.seen, m.appended, m.overwritten, m.skipped
            ));
            if m.deferred + m.failed_writes + m.malformed > 0 {
                lines.push(format!(
                    "  deferred {}, failed writes {}, malformed {}",
                    m.deferred, m.failed_writes, m.malformed
                ));
            }
        }

        let totals = self.totals();
        lines.push(format!(
            "Total: {} written, {} skipped, {} deferred",
            self.total_written(),
            totals.skipped,
            totals.deferred
        ));
        lines.join("\n")
    }
}
