//! Integration tests for the capraise CLI commands.

use capraise_cli::cli::{CategoryArg, ConfigAction, ConfigArgs, ExtractArgs, ShowArgs};
use capraise_cli::commands::{self, config::init_config};
use capraise_cli::config::OutputFormat;
use capraise_cli::{CliError, Config, Formatter};
use capraise_domain::{ReportCategory, RowSchema, SheetStore};
use capraise_store::SqliteSheetStore;
use std::fs;
use tempfile::TempDir;

const MARKUP: &str = "<html><body><table>\
    <tr><td>기준주가</td><td>10,000</td></tr>\
    <tr><td>확정발행가액</td><td>9,200</td></tr>\
    </table></body></html>";

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Quiet, false)
}

fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.store.path = dir.path().join("data").join("capraise.db");
    config
}

#[test]
fn test_extract_from_markup_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("filing.html");
    fs::write(&path, MARKUP).unwrap();

    let args = ExtractArgs {
        path,
        category: CategoryArg::RightsIssue,
        key: Some("20240305000123".to_string()),
    };
    commands::execute_extract(args, &config_in(&dir), &quiet()).unwrap();
}

#[test]
fn test_extract_rejects_bad_key_and_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("filing.html");
    fs::write(&path, MARKUP).unwrap();

    let bad_key = ExtractArgs {
        path: path.clone(),
        category: CategoryArg::ConvertibleBond,
        key: Some("not-a-key".to_string()),
    };
    assert!(matches!(
        commands::execute_extract(bad_key, &config_in(&dir), &quiet()),
        Err(CliError::InvalidInput(_))
    ));

    let missing = ExtractArgs {
        path: dir.path().join("absent.zip"),
        category: CategoryArg::ConvertibleBond,
        key: None,
    };
    assert!(matches!(
        commands::execute_extract(missing, &config_in(&dir), &quiet()),
        Err(CliError::Io(_))
    ));
}

#[test]
fn test_show_without_store_or_table() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let args = || ShowArgs {
        category: CategoryArg::RightsIssue,
        limit: 5,
    };

    // No database file yet
    commands::execute_show(args(), &config, &quiet()).unwrap();
    assert!(!config.store.path.exists());

    // Database without the table
    fs::create_dir_all(config.store.path.parent().unwrap()).unwrap();
    SqliteSheetStore::new(&config.store.path).unwrap();
    commands::execute_show(args(), &config, &quiet()).unwrap();
}

#[test]
fn test_show_stored_rows() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::create_dir_all(config.store.path.parent().unwrap()).unwrap();

    let schema = RowSchema::for_category(ReportCategory::ConvertibleBond);
    let table = config.reconciler.table_for(ReportCategory::ConvertibleBond).to_string();
    let mut store = SqliteSheetStore::new(&config.store.path).unwrap();
    store.ensure_table(&table, &schema.header()).unwrap();
    store
        .append_rows(&table, &[vec!["20240305000123".to_string()]])
        .unwrap();
    drop(store);

    let args = ShowArgs {
        category: CategoryArg::ConvertibleBond,
        limit: 10,
    };
    commands::execute_show(args, &config, &Formatter::new(OutputFormat::Table, false)).unwrap();
}

#[test]
fn test_config_init_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf").join("config.toml");

    init_config(&path, false).unwrap();
    assert!(path.exists());
    assert!(matches!(init_config(&path, false), Err(CliError::InvalidInput(_))));
    init_config(&path, true).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.settings.format, OutputFormat::Table);
}

#[test]
fn test_config_command_actions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let config = Config::default();

    commands::execute_config(ConfigArgs { action: None }, &path, &config, &quiet()).unwrap();
    commands::execute_config(
        ConfigArgs {
            action: Some(ConfigAction::Path),
        },
        &path,
        &config,
        &quiet(),
    )
    .unwrap();
    commands::execute_config(
        ConfigArgs {
            action: Some(ConfigAction::Init { force: false }),
        },
        &path,
        &config,
        &quiet(),
    )
    .unwrap();
    assert!(path.exists());
}
