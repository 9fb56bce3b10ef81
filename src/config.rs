use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";

/// Runtime configuration. Every field may be omitted from the config file and
/// falls back to its default.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Maximum number of URLs in the rendered report table.
    pub report_size: usize,
    /// Directory scanned for dated access logs.
    pub log_dir: PathBuf,
    /// Directory the report files are written into.
    pub report_dir: PathBuf,
    /// HTML template with the `$table_json` placeholder.
    pub template_path: PathBuf,
    /// Tolerable fraction of unparsable lines before a warning is raised.
    pub error_threshold: f64,
    /// When set, diagnostics are appended to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: 1000,
            log_dir: PathBuf::from("./log"),
            report_dir: PathBuf::from("./reports"),
            template_path: PathBuf::from("./report.html"),
            error_threshold: 0.5,
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Option<Config>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(Some(config))
    }
}

/// Resolves the effective configuration. An explicitly named file must exist;
/// the default location may be absent, in which case the defaults apply.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)?
            .with_context(|| format!("Config file not found: {}", path.display())),
        None => Ok(Config::load(Path::new(DEFAULT_CONFIG_PATH))?.unwrap_or_default()),
    }
}
