//! # Load Test Report
//!
//! File: cli/src/commands/loadtest/report.rs
//!
//! Collects per-request samples while the test runs and turns them into
//! latency and throughput statistics grouped by request name.
//!
use super::scenarios::Scenario;
use crate::core::error::Result;
use anyhow::Context;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, Default)]
struct Samples {
    latencies_ms: Vec<f64>,
    failures: usize,
}

/// Accumulates request outcomes from every virtual user.
#[derive(Debug, Default)]
pub struct StatsCollector {
    requests: HashMap<&'static str, Samples>,
    errors: BTreeMap<String, usize>,
}

impl StatsCollector {
    /// Records one request. `error` is set for transport failures and non-2xx responses.
    pub fn record(&mut self, name: &'static str, elapsed_ms: f64, error: Option<String>) {
        let samples = self.requests.entry(name).or_default();
        samples.latencies_ms.push(elapsed_ms);
        if let Some(error) = error {
            samples.failures += 1;
            *self.errors.entry(format!("{}: {}", name, error)).or_insert(0) += 1;
        }
    }

    pub fn into_report(self, scenarios: Vec<Scenario>, users: usize, elapsed_secs: f64) -> Report {
        let mut requests: Vec<RequestStats> = self
            .requests
            .into_iter()
            .map(|(name, samples)| RequestStats::from_samples(name, samples, elapsed_secs))
            .collect();
        requests.sort_by(|a, b| a.name.cmp(&b.name));

        let total = RequestStats::aggregate(&requests, elapsed_secs);
        Report {
            scenarios,
            users,
            duration_secs: elapsed_secs,
            requests,
            total,
            errors: self.errors,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestStats {
    pub name: String,
    pub count: usize,
    pub failures: usize,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub requests_per_sec: f64,
    #[serde(skip)]
    sorted_ms: Vec<f64>,
}

impl RequestStats {
    fn from_samples(name: &str, samples: Samples, elapsed_secs: f64) -> Self {
        let mut sorted_ms = samples.latencies_ms;
        sorted_ms.sort_by(f64::total_cmp);
        Self::from_sorted(name.to_string(), sorted_ms, samples.failures, elapsed_secs)
    }

    fn from_sorted(name: String, sorted_ms: Vec<f64>, failures: usize, elapsed_secs: f64) -> Self {
        let count = sorted_ms.len();
        let sum: f64 = sorted_ms.iter().sum();
        Self {
            name,
            count,
            failures,
            min_ms: sorted_ms.first().copied().unwrap_or(0.0),
            avg_ms: if count > 0 { sum / count as f64 } else { 0.0 },
            max_ms: sorted_ms.last().copied().unwrap_or(0.0),
            median_ms: percentile(&sorted_ms, 50.0),
            p95_ms: percentile(&sorted_ms, 95.0),
            requests_per_sec: if elapsed_secs > 0.0 {
                count as f64 / elapsed_secs
            } else {
                0.0
            },
            sorted_ms,
        }
    }

    fn aggregate(rows: &[RequestStats], elapsed_secs: f64) -> Self {
        let mut all: Vec<f64> = rows.iter().flat_map(|r| r.sorted_ms.iter().copied()).collect();
        all.sort_by(f64::total_cmp);
        let failures = rows.iter().map(|r| r.failures).sum();
        Self::from_sorted("Aggregated".to_string(), all, failures, elapsed_secs)
    }

    pub fn failure_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.failures as f64 / self.count as f64 * 100.0
        }
    }
}

/// Nearest-rank percentile of an ascending slice; 0 for no samples.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scenarios: Vec<Scenario>,
    pub users: usize,
    pub duration_secs: f64,
    pub requests: Vec<RequestStats>,
    pub total: RequestStats,
    /// Failure descriptions with occurrence counts.
    pub errors: BTreeMap<String, usize>,
}

impl Report {
    /// Fixed-width summary table.
    pub fn render_table(&self) -> String {
        let scenarios: Vec<String> = self.scenarios.iter().map(|s| s.to_string()).collect();
        let mut out = format!(
            "Load test: {} users, scenarios [{}], {:.1}s\n\n",
            self.users,
            scenarios.join(", "),
            self.duration_secs
        );
        out.push_str(&format!(
            "{:<28} {:>7} {:>7} {:>9} {:>9} {:>9} {:>9} {:>9} {:>8}\n",
            "Name", "Reqs", "Fails", "Min(ms)", "Avg(ms)", "Med(ms)", "p95(ms)", "Max(ms)", "Req/s"
        ));
        let rule = format!("{}\n", "-".repeat(105));
        out.push_str(&rule);
        for row in &self.requests {
            out.push_str(&format_row(row));
        }
        out.push_str(&rule);
        out.push_str(&format_row(&self.total));
        out.push_str(&format!("\nFailure rate: {:.1}%\n", self.total.failure_rate()));
        if !self.errors.is_empty() {
            out.push_str("\nFailures:\n");
            for (error, count) in &self.errors {
                out.push_str(&format!("  {:>5}x {}\n", count, error));
            }
        }
        out
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize load test report")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(())
    }
}

fn format_row(row: &RequestStats) -> String {
    format!(
        "{:<28} {:>7} {:>7} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>8.2}\n",
        row.name,
        row.count,
        row.failures,
        row.min_ms,
        row.avg_ms,
        row.median_ms,
        row.p95_ms,
        row.max_ms,
        row.requests_per_sec
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_percentile() {
        let sorted: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(percentile(&sorted, 50.0), 10.0);
        assert_eq!(percentile(&sorted, 95.0), 19.0);
        assert_eq!(percentile(&sorted, 100.0), 20.0);
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    fn sample_report() -> Report {
        let mut collector = StatsCollector::default();
        for ms in [10.0, 20.0, 30.0, 40.0] {
            collector.record("Send Chat Message", ms, None);
        }
        collector.record("Get Context", 5.0, Some("HTTP 404".to_string()));
        collector.into_report(vec![Scenario::Chatbot], 3, 2.0)
    }

    #[test]
    fn test_report_statistics() {
        let report = sample_report();
        assert_eq!(report.requests.len(), 2);
        let chat = report.requests.iter().find(|r| r.name == "Send Chat Message").unwrap();
        assert_eq!(chat.count, 4);
        assert_eq!(chat.failures, 0);
        assert_eq!(chat.min_ms, 10.0);
        assert_eq!(chat.avg_ms, 25.0);
        assert_eq!(chat.median_ms, 20.0);
        assert_eq!(chat.max_ms, 40.0);
        assert_eq!(chat.requests_per_sec, 2.0);

        assert_eq!(report.total.count, 5);
        assert_eq!(report.total.failures, 1);
        assert_eq!(report.total.failure_rate(), 20.0);
        assert_eq!(report.errors.get("Get Context: HTTP 404"), Some(&1));
    }

    #[test]
    fn test_render_table_lists_rows() {
        let table = sample_report().render_table();
        assert!(table.contains("Send Chat Message"));
        assert!(table.contains("Aggregated"));
        assert!(table.contains("Failures:"));
    }

    #[test]
    fn test_write_json() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("report.json");
        sample_report().write_json(&path)?;
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(value["total"]["count"], 5);
        assert_eq!(value["scenarios"][0], "chatbot");
        assert!(value["total"].get("sorted_ms").is_none());
        Ok(())
    }
}
