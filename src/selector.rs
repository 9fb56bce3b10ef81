use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

/// Filename convention for the UI access logs: `nginx-access-ui.log-YYYYMMDD`,
/// optionally gzipped.
static LOG_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^nginx-access-ui\.log-(\d{8})(\.gz)?$").expect("valid pattern"));

/// The selected log source: where it lives and the date embedded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub date: NaiveDate,
}

/// Parses the date embedded in a log filename. Returns `None` for names that
/// do not follow the convention or carry an impossible calendar date.
pub fn parse_log_name(name: &str) -> Option<NaiveDate> {
    let caps = LOG_NAME_PATTERN.captures(name)?;
    NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()
}

/// Scans `dir` (non-recursively) and returns the log with the latest embedded
/// date, or `None` when no entry matches the naming convention.
pub fn find_latest_log(dir: &Path) -> Result<Option<LogFile>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory {}", dir.display()))?;

    let mut latest: Option<LogFile> = None;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(date) = parse_log_name(name) else {
            continue;
        };
        if latest.as_ref().is_none_or(|l| date > l.date) {
            latest = Some(LogFile {
                path: entry.path(),
                date,
            });
        }
    }

    Ok(latest)
}
