//! Capraise CLI - collect capital-raising disclosures from DART.

use capraise_cli::commands;
use capraise_cli::{log_filter, Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> capraise_cli::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&path)?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    // Inspecting or re-initializing the file must not require valid values
    if !matches!(cli.command, Command::Config(_)) {
        config.validate()?;
    }

    match cli.command {
        Command::Sync(args) => commands::execute_sync(args, &config, &formatter),
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter),
        Command::Show(args) => commands::execute_show(args, &config, &formatter),
        Command::Config(args) => commands::execute_config(args, &path, &config, &formatter),
    }
}
