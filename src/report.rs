use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Config;
use crate::stats::AggregationResult;

const TABLE_PLACEHOLDER: &str = "$table_json";

/// One row of the report table: the URL key plus its finalized statistics.
/// Field order here is the field order in the rendered JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    pub url: String,
    pub count: u64,
    pub count_perc: f64,
    pub time_sum: f64,
    pub time_max: f64,
    pub time_avg: f64,
    pub time_med: f64,
    pub time_perc: f64,
}

/// Orders URLs by their total time contribution and keeps the top
/// `report_size` entries.
pub fn rank(result: AggregationResult, report_size: usize) -> Vec<ReportRecord> {
    let mut records: Vec<ReportRecord> = result
        .urls
        .into_iter()
        .map(|(url, stat)| ReportRecord {
            url,
            count: stat.count,
            count_perc: stat.count_perc,
            time_sum: stat.time_sum,
            time_max: stat.time_max,
            time_avg: stat.time_avg,
            time_med: stat.time_med,
            time_perc: stat.time_perc,
        })
        .collect();

    records.sort_by(|a, b| b.time_sum.total_cmp(&a.time_sum));
    records.truncate(report_size);
    records
}

/// Substitutes the ranked table into the HTML template.
pub fn render(records: &[ReportRecord], template: &str) -> Result<String> {
    let table_json =
        serde_json::to_string(records).context("Failed to serialize report table")?;
    Ok(template.replace(TABLE_PLACEHOLDER, &table_json))
}

/// Renders the report for the log dated `date` and writes it into the report
/// directory. Returns the path of the written file.
pub fn write_report(
    records: &[ReportRecord],
    date: NaiveDate,
    config: &Config,
) -> Result<PathBuf> {
    let template = fs::read_to_string(&config.template_path).with_context(|| {
        format!(
            "Failed to read report template {}",
            config.template_path.display()
        )
    })?;
    let rendered = render(records, &template)?;

    fs::create_dir_all(&config.report_dir).with_context(|| {
        format!(
            "Failed to create report directory {}",
            config.report_dir.display()
        )
    })?;
    let report_path = config
        .report_dir
        .join(format!("report-{}.html", date.format("%Y.%m.%d")));
    fs::write(&report_path, rendered)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;

    Ok(report_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::UrlStat;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn stat(count: u64, time_sum: f64) -> UrlStat {
        UrlStat {
            count,
            time_sum,
            time_max: time_sum,
            time_avg: time_sum / count as f64,
            time_med: time_sum / count as f64,
            count_perc: 0.0,
            time_perc: 0.0,
        }
    }

    fn sample_result() -> AggregationResult {
        let mut urls = HashMap::new();
        urls.insert("/light".to_string(), stat(10, 0.5));
        urls.insert("/heavy".to_string(), stat(2, 9.5));
        urls.insert("/medium".to_string(), stat(5, 3.0));
        AggregationResult {
            urls,
            total_requests: 17,
            error_count: 0,
        }
    }

    #[test]
    fn rank_sorts_by_time_sum_descending() {
        let records = rank(sample_result(), 1000);

        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["/heavy", "/medium", "/light"]);
        assert!(records.windows(2).all(|w| w[0].time_sum >= w[1].time_sum));
    }

    #[test]
    fn rank_truncates_to_report_size() {
        assert_eq!(rank(sample_result(), 2).len(), 2);
        assert_eq!(rank(sample_result(), 3).len(), 3);
        // Fewer URLs than the configured size.
        assert_eq!(rank(sample_result(), 1000).len(), 3);
    }

    #[test]
    fn render_substitutes_the_table_placeholder() {
        let records = vec![ReportRecord {
            url: "/api/v2/banner/1".to_string(),
            count: 7,
            count_perc: 100.0,
            time_sum: 2.267,
            time_max: 0.704,
            time_avg: 0.324,
            time_med: 0.199,
            time_perc: 100.0,
        }];

        let rendered = render(&records, "var table = $table_json;").expect("render");

        assert!(rendered.starts_with("var table = ["));
        // Renderer contract: exact key set and order.
        assert!(rendered.contains(
            "{\"url\":\"/api/v2/banner/1\",\"count\":7,\"count_perc\":100.0,\
             \"time_sum\":2.267,\"time_max\":0.704,\"time_avg\":0.324,\
             \"time_med\":0.199,\"time_perc\":100.0}"
        ));
    }

    #[test]
    fn write_report_names_the_file_after_the_log_date() {
        let dir = TempDir::new().expect("tempdir");
        let template_path = dir.path().join("report.html");
        fs::write(&template_path, "<html>$table_json</html>").expect("write template");

        let config = Config {
            report_dir: dir.path().join("reports"),
            template_path,
            ..Config::default()
        };
        let records = rank(sample_result(), 1000);
        let date = NaiveDate::from_ymd_opt(2017, 6, 30).unwrap();

        let path = write_report(&records, date, &config).expect("write report");

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("report-2017.06.30.html")
        );
        let contents = fs::read_to_string(&path).expect("read report");
        assert!(contents.starts_with("<html>["));
        assert!(contents.contains("/heavy"));
        assert!(!contents.contains(TABLE_PLACEHOLDER));
    }
}
