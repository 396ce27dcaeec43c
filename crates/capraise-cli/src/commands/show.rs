//! Show command implementation.

use crate::cli::ShowArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use capraise_domain::{ReportCategory, Row, SheetStore};
use capraise_store::StoreError;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let category = ReportCategory::from(args.category);
    let table = config.reconciler.table_for(category).to_string();

    if !config.store.path.exists() {
        println!("{}", formatter.info(&format!("No store at {}", config.store.path.display())));
        return Ok(());
    }
    let store = open_store(&config.store.path)?;
    let rows = match store.read_rows(&table) {
        Ok(rows) => rows,
        Err(StoreError::TableNotFound(_)) => {
            println!("{}", formatter.info(&format!("Table {} has not been created yet", table)));
            return Ok(());
        }
        Err(e) => return Err(CliError::Store(e)),
    };

    let (header, recent) = latest_rows(rows, args.limit);
    println!("{}", formatter.format_rows(&header, &recent)?);
    Ok(())
}

/// Split off the header and keep the last `limit` rows, most recent first
pub(crate) fn latest_rows(mut rows: Vec<Row>, limit: usize) -> (Row, Vec<Row>) {
    if rows.is_empty() {
        return (Row::new(), Vec::new());
    }
    let header = rows.remove(0);
    let recent = rows.into_iter().rev().take(limit).collect();
    (header, recent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cell: &str) -> Row {
        vec![cell.to_string()]
    }

    #[test]
    fn test_latest_rows() {
        let rows = vec![row("접수번호"), row("1"), row("2"), row("3")];
        let (header, recent) = latest_rows(rows, 2);
        assert_eq!(header, row("접수번호"));
        assert_eq!(recent, vec![row("3"), row("2")]);
    }

    #[test]
    fn test_latest_rows_empty() {
        let (header, recent) = latest_rows(Vec::new(), 5);
        assert!(header.is_empty());
        assert!(recent.is_empty());
    }
}
