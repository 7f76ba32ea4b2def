//! # EduBot Load Test Command
//!
//! File: cli/src/commands/loadtest/mod.rs
//!
//! ## Overview
//!
//! `edubot loadtest` simulates concurrent users against a running EduBot
//! server and prints per-endpoint latency and throughput.
//!
//! ## Examples
//!
//! ```bash
//! # 10 chatbot users for 30 seconds against the local server
//! edubot loadtest
//!
//! # Mixed traffic, 100 users spawned at 10/s, report saved as JSON
//! edubot loadtest --host http://localhost:5000 -u 100 -r 10 \
//!     --scenario chatbot --scenario guest --scenario admin --json report.json
//! ```
//!
//! Unset flags fall back to the `[loadtest]` configuration section.
//!
use crate::core::config::{Config, LoadTestSection};
use crate::core::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub mod report;
pub mod runner;
pub mod scenarios;

use runner::LoadTestPlan;
use scenarios::Scenario;

#[derive(Parser, Debug)]
pub struct LoadTestArgs {
    /// Base URL of the server under test.
    #[arg(long)]
    pub host: Option<String>,

    /// Number of concurrent virtual users.
    #[arg(long, short)]
    pub users: Option<usize>,

    /// Users started per second.
    #[arg(long = "spawn-rate", short = 'r')]
    pub spawn_rate: Option<f64>,

    /// Test duration in seconds.
    #[arg(long, short)]
    pub duration: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// User classes to simulate; repeat to mix them.
    #[arg(long = "scenario", short = 's', value_enum, default_value = "chatbot")]
    pub scenarios: Vec<Scenario>,

    /// Also write the report as JSON to this path.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl LoadTestArgs {
    fn into_plan(self, settings: &LoadTestSection) -> (LoadTestPlan, Option<PathBuf>) {
        let plan = LoadTestPlan {
            host: self.host.unwrap_or_else(|| settings.host.clone()),
            scenarios: self.scenarios,
            users: self.users.unwrap_or(settings.users),
            spawn_rate: self.spawn_rate.unwrap_or(settings.spawn_rate),
            duration: Duration::from_secs(self.duration.unwrap_or(settings.duration_secs)),
            timeout: Duration::from_secs(self.timeout.unwrap_or(settings.timeout_secs)),
        };
        let json = self
            .json
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()));
        (plan, json)
    }
}

pub async fn handle_loadtest(args: LoadTestArgs, config: Config) -> Result<()> {
    let (plan, json_path) = args.into_plan(&config.loadtest);
    info!("Load test plan: {:?}", plan);

    println!(
        "🚀 Load testing {} with {} users for {}s...",
        plan.host,
        plan.users,
        plan.duration.as_secs()
    );
    let report = runner::run(&plan).await?;
    print!("\n{}", report.render_table());

    if let Some(path) = json_path {
        report.write_json(&path)?;
        println!("\n📄 Report written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = LoadTestArgs::parse_from([
            "loadtest", "-u", "50", "-r", "5", "-s", "admin", "-s", "guest", "--json", "out.json",
        ]);
        let (plan, json) = args.into_plan(&LoadTestSection::default());
        assert_eq!(plan.users, 50);
        assert_eq!(plan.spawn_rate, 5.0);
        assert_eq!(plan.scenarios, vec![Scenario::Admin, Scenario::Guest]);
        assert_eq!(plan.host, LoadTestSection::default().host);
        assert_eq!(json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_defaults_from_config() {
        let settings = LoadTestSection {
            host: "http://edubot.internal:8080".to_string(),
            users: 4,
            spawn_rate: 1.0,
            duration_secs: 12,
            timeout_secs: 3,
        };
        let (plan, json) = LoadTestArgs::parse_from(["loadtest"]).into_plan(&settings);
        assert_eq!(plan.host, "http://edubot.internal:8080");
        assert_eq!(plan.users, 4);
        assert_eq!(plan.duration, Duration::from_secs(12));
        assert_eq!(plan.timeout, Duration::from_secs(3));
        assert_eq!(plan.scenarios, vec![Scenario::Chatbot]);
        assert!(json.is_none());
    }
}
