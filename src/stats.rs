use std::collections::HashMap;
use std::io;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

/// Extraction pattern for one access-log line: the quoted HTTP request and
/// the trailing request-time field. Lines with other methods or a malformed
/// request do not match and are counted as unparsable.
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:GET|POST|DELETE|PUT) (.+) HTTP/1\.[01]".* (\d+\.\d{3})$"#)
        .expect("valid pattern")
});

/// Accumulation-phase record for one URL. Holds the raw samples until the
/// median is computed, then collapses into a [`UrlStat`].
#[derive(Debug, Default)]
struct UrlAccumulator {
    count: u64,
    time_sum: f64,
    time_max: f64,
    time_avg: f64,
    time_values: Vec<f64>,
}

impl UrlAccumulator {
    fn observe(&mut self, time: f64) {
        self.time_sum += time;
        self.time_max = self.time_max.max(time);
        self.time_avg = (self.time_avg * self.count as f64 + time) / (self.count as f64 + 1.0);
        self.time_values.push(time);
        self.count += 1;
    }

    fn finalize(mut self, total_requests: u64, total_time: f64) -> UrlStat {
        let count_perc = if total_requests == 0 {
            0.0
        } else {
            round3(self.count as f64 / total_requests as f64 * 100.0)
        };
        let time_perc = if total_time == 0.0 {
            0.0
        } else {
            round3(self.time_sum / total_time * 100.0)
        };

        UrlStat {
            count: self.count,
            time_sum: round3(self.time_sum),
            time_max: round3(self.time_max),
            time_avg: round3(self.time_avg),
            time_med: round3(median(&mut self.time_values)),
            count_perc,
            time_perc,
        }
    }
}

/// Finalized per-URL statistics, times in seconds rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlStat {
    pub count: u64,
    pub time_sum: f64,
    pub time_max: f64,
    pub time_avg: f64,
    pub time_med: f64,
    pub count_perc: f64,
    pub time_perc: f64,
}

#[derive(Debug, Default)]
pub struct AggregationResult {
    pub urls: HashMap<String, UrlStat>,
    pub total_requests: u64,
    pub error_count: u64,
}

fn parse_line(line: &str) -> Option<(&str, f64)> {
    let caps = LINE_PATTERN.captures(line)?;
    let url = caps.get(1)?.as_str();
    let time = caps[2].parse::<f64>().ok()?;
    Some((url, time))
}

/// Consumes the line stream in a single pass and produces the finalized
/// per-URL statistics. Unparsable lines are counted, never fatal; I/O and
/// decoding errors from the stream abort the run.
pub fn aggregate(
    lines: impl Iterator<Item = io::Result<String>>,
    error_threshold: f64,
) -> Result<AggregationResult> {
    let mut urls: HashMap<String, UrlAccumulator> = HashMap::new();
    let mut total_requests = 0u64;
    let mut error_count = 0u64;
    let mut total_time = 0.0f64;

    for line in lines {
        let line = line.context("Failed to read log line")?;
        match parse_line(&line) {
            Some((url, time)) => {
                urls.entry(url.to_string()).or_default().observe(time);
                total_time += time;
            }
            None => error_count += 1,
        }
        total_requests += 1;
    }

    if total_requests == 0 {
        tracing::info!("log file contains no lines");
        return Ok(AggregationResult::default());
    }

    let error_ratio = error_count as f64 / total_requests as f64;
    if error_ratio >= error_threshold {
        tracing::warn!(
            error_count,
            total_requests,
            "{:.1}% of the log lines could not be parsed",
            error_ratio * 100.0
        );
    }

    let urls = urls
        .into_iter()
        .map(|(url, acc)| (url, acc.finalize(total_requests, total_time)))
        .collect();

    Ok(AggregationResult {
        urls,
        total_requests,
        error_count,
    })
}

/// Standard statistical median: the middle sample, or the mean of the two
/// middle samples for even counts.
fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Rounds to 3 decimals, half away from zero.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
