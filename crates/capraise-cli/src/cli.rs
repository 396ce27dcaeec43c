//! CLI command definitions and argument parsing.

use capraise_domain::ReportCategory;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Capraise - collect capital-raising disclosures from DART into a local store.
#[derive(Debug, Parser)]
#[command(name = "capraise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.capraise/config.toml)
    #[arg(short, long, global = true, env = "CAPRAISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (keys and counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch filings in a date range and reconcile them into the store
    Sync(SyncArgs),

    /// Extract facts from a downloaded document container
    Extract(ExtractArgs),

    /// Show stored rows of a category
    Show(ShowArgs),

    /// Show or initialize the configuration
    Config(ConfigArgs),
}

/// Arguments for the sync command.
#[derive(Debug, Parser)]
pub struct SyncArgs {
    /// First receipt date (YYYY-MM-DD), default: lookback from today
    #[arg(long)]
    pub from: Option<String>,

    /// Last receipt date (YYYY-MM-DD), default: today
    #[arg(long)]
    pub to: Option<String>,

    /// Categories to process (repeatable), default: from configuration
    #[arg(long, value_enum)]
    pub category: Vec<CategoryArg>,

    /// Log decisions without writing rows
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// ZIP archive or markup file
    pub path: PathBuf,

    /// Report category of the filing
    #[arg(long, value_enum)]
    pub category: CategoryArg,

    /// Receipt number, to find the main document inside the archive
    #[arg(long)]
    pub key: Option<String>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Category whose table to show
    #[arg(value_enum)]
    pub category: CategoryArg,

    /// Maximum number of rows (most recent first)
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Configuration actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Category argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CategoryArg {
    /// Rights issue (유상증자)
    #[value(alias = "ri")]
    RightsIssue,
    /// Convertible bond (전환사채)
    #[value(alias = "cb")]
    ConvertibleBond,
    /// Exchangeable bond (교환사채)
    #[value(alias = "eb")]
    ExchangeableBond,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<CategoryArg> for ReportCategory {
    fn from(category: CategoryArg) -> Self {
        match category {
            CategoryArg::RightsIssue => ReportCategory::RightsIssue,
            CategoryArg::ConvertibleBond => ReportCategory::ConvertibleBond,
            CategoryArg::ExchangeableBond => ReportCategory::ExchangeableBond,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_command() {
        let cli = Cli::parse_from([
            "capraise",
            "sync",
            "--from",
            "2024-03-01",
            "--category",
            "cb",
            "--category",
            "exchangeable-bond",
            "--dry-run",
        ]);
        match cli.command {
            Command::Sync(args) => {
                assert_eq!(args.from.as_deref(), Some("2024-03-01"));
                assert_eq!(
                    args.category,
                    [CategoryArg::ConvertibleBond, CategoryArg::ExchangeableBond]
                );
                assert!(args.dry_run);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["capraise", "show", "rights-issue", "-vv", "--format", "json"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.category, CategoryArg::RightsIssue);
                assert_eq!(args.limit, 20);
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_config_action_is_optional() {
        let cli = Cli::parse_from(["capraise", "config"]);
        assert!(matches!(cli.command, Command::Config(ConfigArgs { action: None })));
    }

    #[test]
    fn test_category_conversion() {
        let category: ReportCategory = CategoryArg::ConvertibleBond.into();
        assert_eq!(category, ReportCategory::ConvertibleBond);
    }
}
