//! Sync command implementation.

use crate::cli::SyncArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use capraise_dart::{DartDetailFetcher, DartDocumentRetriever, DartLocator, DartSession};
use capraise_domain::{DateRange, ReportCategory};
use capraise_extractor::FieldExtractor;
use capraise_reconciler::{Pipeline, ReconcilerConfig};
use chrono::{Days, Local, NaiveDate};
use tracing::info;

/// Execute the sync command.
pub fn execute_sync(args: SyncArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let today = Local::now().date_naive();
    let range = resolve_range(
        args.from.as_deref(),
        args.to.as_deref(),
        today,
        config.settings.lookback_days,
    )?;
    let reconciler = run_config(&args, &config.reconciler)?;

    let session = DartSession::new(config.dart.clone())?;
    let store = open_store(&config.store.path)?;
    let mut pipeline = Pipeline::new(
        reconciler,
        FieldExtractor::new(config.extractor.clone())?,
        DartLocator::new(&session),
        DartDetailFetcher::new(&session),
        DartDocumentRetriever::new(&session),
        store,
    )?;

    info!(
        "Syncing {} to {} into {}",
        range.start,
        range.end,
        config.store.path.display()
    );
    let report = pipeline.run(&range)?;

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Reconciler settings for this run: command-line categories and dry-run win
pub(crate) fn run_config(args: &SyncArgs, base: &ReconcilerConfig) -> Result<ReconcilerConfig> {
    let mut config = base.clone();
    if !args.category.is_empty() {
        let mut categories: Vec<String> = Vec::new();
        for category in &args.category {
            let name = ReportCategory::from(*category).as_str().to_string();
            if !categories.contains(&name) {
                categories.push(name);
            }
        }
        config.categories = categories;
    }
    config.dry_run |= args.dry_run;
    config.validate().map_err(CliError::Config)?;
    Ok(config)
}

/// Inclusive receipt-date range from the optional bounds
///
/// A missing end is today; a missing start is `lookback_days` before the end.
pub(crate) fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
    lookback_days: u32,
) -> Result<DateRange> {
    let end = match to {
        Some(text) => parse_day(text)?,
        None => today,
    };
    let start = match from {
        Some(text) => parse_day(text)?,
        None => end
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .ok_or_else(|| CliError::InvalidInput(format!("Lookback of {} days is out of range", lookback_days)))?,
    };

    DateRange::new(start.into(), end.into())
        .ok_or_else(|| CliError::InvalidInput(format!("Start date {} is after end date {}", start, end)))
}

fn parse_day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidInput(format!("Invalid date (expected YYYY-MM-DD): {}", text)))
}
