use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod config;
mod logging;
mod reader;
mod report;
mod selector;
mod stats;

#[derive(Parser)]
#[command(name = "logreport")]
#[command(version)]
struct Cli {
    /// Custom config file (TOML). Falls back to ./config.toml, then to
    /// built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(config.log_file.as_deref()) {
        eprintln!("Error setting up logging: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run(&config) {
        tracing::error!("unexpected error: {e:#}");
        std::process::exit(1);
    }
}

fn run(config: &config::Config) -> Result<()> {
    tracing::info!(dir = %config.log_dir.display(), "searching for the most recent log file");
    let Some(log) = selector::find_latest_log(&config.log_dir)? else {
        tracing::info!("no log file found, nothing to do");
        return Ok(());
    };
    tracing::info!(path = %log.path.display(), "log file found");

    let lines = reader::open_log_lines(&log.path)?;
    let result = stats::aggregate(lines, config.error_threshold)
        .with_context(|| format!("Failed to process {}", log.path.display()))?;

    let records = report::rank(result, config.report_size);
    let report_path = report::write_report(&records, log.date, config)?;
    tracing::info!(path = %report_path.display(), "report written");

    Ok(())
}
