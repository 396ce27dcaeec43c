//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use capraise_domain::{DocumentArchive, FilingKey, ReportCategory};
use capraise_extractor::FieldExtractor;
use std::fs;
use tracing::debug;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let category = ReportCategory::from(args.category);
    let key = args
        .key
        .map(FilingKey::new)
        .transpose()
        .map_err(CliError::InvalidInput)?;

    let bytes = fs::read(&args.path)?;
    debug!("Read {} bytes from {}", bytes.len(), args.path.display());

    let extractor = FieldExtractor::new(config.extractor.clone())?;
    let extraction = extractor.extract(&DocumentArchive::new(bytes), category, key.as_ref());

    println!("{}", formatter.format_extraction(category, &extraction)?);
    Ok(())
}
