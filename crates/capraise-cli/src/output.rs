//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use capraise_domain::{ExtractedFacts, ReportCategory, Row};
use capraise_extractor::Extraction;
use capraise_reconciler::{Outcome, RunReport};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of a sync run.
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_report_json(report),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(self.format_report_quiet(report)),
        }
    }

    fn format_report_json(&self, report: &RunReport) -> Result<String> {
        let categories: serde_json::Map<String, serde_json::Value> = report
            .metrics
            .categories
            .iter()
            .map(|(category, m)| {
                (
                    category.as_str().to_string(),
                    serde_json::json!({
                        "seen": m.seen,
                        "appended": m.appended,
                        "overwritten": m.overwritten,
                        "skipped": m.skipped,
                        "deferred": m.deferred,
                        "failed_writes": m.failed_writes,
                        "malformed": m.malformed,
                    }),
                )
            })
            .collect();
        let outcomes: Vec<serde_json::Value> = report
            .outcomes
            .iter()
            .map(|o| {
                serde_json::json!({
                    "category": o.category.as_str(),
                    "key": o.key.as_str(),
                    "company": o.company_name,
                    "outcome": o.outcome.label(),
                    "reason": outcome_reason(&o.outcome),
                })
            })
            .collect();

        let json = serde_json::json!({
            "run_id": report.run_id.to_string(),
            "dry_run": report.dry_run,
            "runtime_ms": report.metrics.runtime_ms,
            "categories": categories,
            "outcomes": outcomes,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_report_table(&self, report: &RunReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Category", "Seen", "Appended", "Overwritten", "Skipped", "Deferred", "Failed", "Malformed"]);
        for (category, m) in &report.metrics.categories {
            builder.push_record([
                category.short_code().to_string(),
                m.seen.to_string(),
                m.appended.to_string(),
                m.overwritten.to_string(),
                m.skipped.to_string(),
                m.deferred.to_string(),
                m.failed_writes.to_string(),
                m.malformed.to_string(),
            ]);
        }

        let mut out = self.table(builder);

        let attention: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Deferred(_) | Outcome::WriteFailed(_)))
            .collect();
        if !attention.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Category", "Receipt", "Company", "Outcome", "Reason"]);
            for o in attention {
                builder.push_record([
                    o.category.short_code(),
                    o.key.as_str(),
                    o.company_name.as_str(),
                    o.outcome.label(),
                    outcome_reason(&o.outcome).unwrap_or_default(),
                ]);
            }
            out.push('\n');
            out.push_str(&self.table(builder));
        }

        out.push('\n');
        let summary = report.metrics.summary();
        if report.dry_run {
            out.push_str(&self.warning(&format!("Dry run, nothing written. {}", summary)));
        } else {
            out.push_str(&self.success(&summary));
        }
        out
    }

    fn format_report_quiet(&self, report: &RunReport) -> String {
        let totals = report.metrics.totals();
        format!(
            "{} {} {} {} {}",
            totals.appended, totals.overwritten, totals.skipped, totals.deferred, totals.failed_writes
        )
    }

    /// Format the facts recovered from one document container.
    pub fn format_extraction(&self, category: ReportCategory, extraction: &Extraction) -> Result<String> {
        let fields = fact_fields(category, &extraction.facts);
        match self.format {
            OutputFormat::Json => {
                let facts: serde_json::Map<String, serde_json::Value> = fields
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), serde_json::Value::String(value)))
                    .collect();
                let json = serde_json::json!({
                    "category": category.as_str(),
                    "malformed": extraction.is_malformed(),
                    "documents": extraction.documents,
                    "facts": facts,
                });
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                if extraction.is_malformed() {
                    return Ok(self.warning("Document container could not be read; every field is unknown."));
                }
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (name, value) in fields {
                    builder.push_record([name.to_string(), value]);
                }
                Ok(self.table(builder))
            }
            OutputFormat::Quiet => Ok(fields
                .into_iter()
                .map(|(name, value)| format!("{}\t{}", name, value))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format stored rows under their header.
    pub fn format_rows(&self, header: &[String], rows: &[Row]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|row| {
                        let object: serde_json::Map<String, serde_json::Value> = header
                            .iter()
                            .enumerate()
                            .map(|(i, label)| {
                                let cell = row.get(i).cloned().unwrap_or_default();
                                (label.clone(), serde_json::Value::String(cell))
                            })
                            .collect();
                        serde_json::Value::Object(object)
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No rows stored.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(header.iter().cloned());
                for row in rows {
                    builder.push_record((0..header.len()).map(|i| row.get(i).cloned().unwrap_or_default()));
                }
                Ok(self.table(builder))
            }
            OutputFormat::Quiet => Ok(rows
                .iter()
                .filter_map(|row| row.first().cloned())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if colors are enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "blue" => text.blue().to_string(),
            _ => text.to_string(),
        }
    }
}

fn outcome_reason(outcome: &Outcome) -> Option<&str> {
    match outcome {
        Outcome::Deferred(reason) | Outcome::WriteFailed(reason) => Some(reason),
        _ => None,
    }
}

/// Display name and cell text of every extracted field relevant to `category`
fn fact_fields(category: ReportCategory, facts: &ExtractedFacts) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("board_resolution_date", facts.board_resolution_date.cell()),
        ("issue_price", facts.issue_price.cell()),
        ("reference_price", facts.reference_price.cell()),
        ("discount_rate", facts.discount_rate.cell()),
        ("subscription_date", facts.subscription_date.cell()),
        ("payment_date", facts.payment_date.cell()),
    ];
    if !category.is_bond() {
        fields.push(("dividend_record_date", facts.dividend_record_date.cell()));
        fields.push(("listing_date", facts.listing_date.cell()));
    }
    fields.push(("investor", facts.investor.cell()));
    if category.is_bond() {
        let options = &facts.bond_options;
        fields.push(("put_option", options.put_option.cell()));
        fields.push(("call_option", options.call_option.cell()));
        fields.push(("call_ratio", options.call_ratio.cell()));
        fields.push(("yield_to_call", options.yield_to_call.cell()));
    }
    fields
}
