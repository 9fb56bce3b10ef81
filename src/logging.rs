use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Diagnostics go to stderr, or to
/// `log_file` when one is configured. `RUST_LOG` overrides the default `info`
/// level.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .compact()
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to initialize logging")?;
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .compact()
                .finish();

            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to initialize logging")?;
        }
    }

    Ok(())
}
