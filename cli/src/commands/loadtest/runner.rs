//! # Load Test Runner
//!
//! File: cli/src/commands/loadtest/runner.rs
//!
//! ## Overview
//!
//! Starts `users` virtual users at `spawn_rate` per second, each a tokio task
//! looping over its scenario until the deadline: pick a weighted task, send
//! its requests, sleep the think time. All users share one `reqwest::Client`
//! (and so its connection pool) and one statistics collector.
//!
use super::report::{Report, StatsCollector};
use super::scenarios::{Method, Request, Scenario};
use crate::core::error::{EdubotError, Result};
use futures_util::future::join_all;
use parking_lot::Mutex;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct LoadTestPlan {
    /// Base URL, e.g. `http://127.0.0.1:5000`.
    pub host: String,
    /// User classes, assigned to virtual users round-robin.
    pub scenarios: Vec<Scenario>,
    pub users: usize,
    /// Users started per second.
    pub spawn_rate: f64,
    pub duration: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl LoadTestPlan {
    fn validate(&self) -> Result<String> {
        if self.users == 0 {
            return Err(EdubotError::LoadTest("at least one user is required".to_string()).into());
        }
        if !(self.spawn_rate.is_finite() && self.spawn_rate > 0.0) {
            return Err(EdubotError::LoadTest(format!("spawn rate must be positive, got {}", self.spawn_rate)).into());
        }
        if self.scenarios.is_empty() {
            return Err(EdubotError::LoadTest("no scenarios selected".to_string()).into());
        }
        if self.duration.is_zero() || self.duration > MAX_DURATION {
            return Err(EdubotError::LoadTest(format!(
                "duration must be positive and at most {}s, got {}s",
                MAX_DURATION.as_secs(),
                self.duration.as_secs()
            ))
            .into());
        }
        let url = reqwest::Url::parse(&self.host)
            .map_err(|e| EdubotError::LoadTest(format!("invalid host '{}': {}", self.host, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EdubotError::LoadTest(format!("host must be an http(s) URL, got '{}'", self.host)).into());
        }
        Ok(self.host.trim_end_matches('/').to_string())
    }
}

/// Runs the plan to completion and returns the collected statistics.
pub async fn run(plan: &LoadTestPlan) -> Result<Report> {
    let base_url = plan.validate()?;
    let client = Client::builder()
        .timeout(plan.timeout)
        .build()
        .map_err(EdubotError::from)?;

    let stats = Arc::new(Mutex::new(StatsCollector::default()));
    let started = Instant::now();
    let deadline = started + plan.duration;
    let spawn_interval = Duration::from_secs_f64(1.0 / plan.spawn_rate);
    let mut rng = fastrand::Rng::new();

    info!(
        "Starting load test against {} with {} users ({}/s) for {:?}",
        base_url, plan.users, plan.spawn_rate, plan.duration
    );

    let mut handles = Vec::with_capacity(plan.users);
    for n in 0..plan.users {
        if n > 0 {
            if Instant::now() + spawn_interval >= deadline {
                warn!("Test ended before all users spawned ({} of {})", n, plan.users);
                break;
            }
            sleep(spawn_interval).await;
        }
        let scenario = plan.scenarios[n % plan.scenarios.len()];
        let user = VirtualUser {
            number: n + 1,
            scenario,
            session_id: scenario.session_id(n + 1, &mut rng),
            rng: fastrand::Rng::with_seed(rng.u64(..)),
        };
        debug!("Spawning user {} ({}, session {})", user.number, scenario, user.session_id);
        handles.push(tokio::spawn(user.run(
            client.clone(),
            base_url.clone(),
            Arc::clone(&stats),
            deadline,
        )));
    }
    let spawned = handles.len();

    for result in join_all(handles).await {
        if let Err(e) = result {
            error!("Virtual user task failed: {}", e);
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    let collector = std::mem::take(&mut *stats.lock());
    info!("Load test finished after {:.1}s", elapsed);
    Ok(collector.into_report(plan.scenarios.clone(), spawned, elapsed))
}

struct VirtualUser {
    number: usize,
    scenario: Scenario,
    session_id: String,
    rng: fastrand::Rng,
}

impl VirtualUser {
    async fn run(mut self, client: Client, base_url: String, stats: Arc<Mutex<StatsCollector>>, deadline: Instant) {
        while Instant::now() < deadline {
            let task = self.scenario.pick_task(&mut self.rng);
            for request in task.requests(&self.session_id, &mut self.rng) {
                if Instant::now() >= deadline {
                    break;
                }
                let begun = Instant::now();
                let outcome = execute(&client, &base_url, &request).await;
                let elapsed_ms = begun.elapsed().as_secs_f64() * 1000.0;
                if let Some(err) = &outcome {
                    debug!("User {} {} failed: {}", self.number, request.name, err);
                }
                stats.lock().record(request.name, elapsed_ms, outcome);
            }

            let think = Duration::from_secs_f64(self.scenario.think(&mut self.rng));
            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(think.min(remaining)).await;
        }
    }
}

/// Sends one request and reads the body. Returns a failure description, or `None` on 2xx.
async fn execute(client: &Client, base_url: &str, request: &Request) -> Option<String> {
    let url = format!("{}{}", base_url, request.path);
    let builder = match request.method {
        Method::Get => client.get(&url),
        Method::Post => client.post(&url),
    };
    let builder = match &request.body {
        Some(body) => builder.json(body),
        None => builder,
    };

    match builder.send().await {
        Ok(response) => {
            let status = response.status();
            let body = response.bytes().await;
            if !status.is_success() {
                Some(format!("HTTP {}", status.as_u16()))
            } else {
                body.err().map(|e| describe(&e))
            }
        }
        Err(e) => Some(describe(&e)),
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_string()
    } else if err.is_connect() {
        "connection error".to_string()
    } else if err.is_body() || err.is_decode() {
        "body error".to_string()
    } else {
        "request error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::serve::config::ServerConfig;
    use crate::commands::serve::server_logic::{create_app, AppState};
    use crate::core::config::Config;
    use std::net::{Ipv4Addr, SocketAddr};
    use tokio::net::TcpListener;

    fn plan(host: String, scenario: Scenario, users: usize, duration_ms: u64) -> LoadTestPlan {
        LoadTestPlan {
            host,
            scenarios: vec![scenario],
            users,
            spawn_rate: 100.0,
            duration: Duration::from_millis(duration_ms),
            timeout: Duration::from_secs(5),
        }
    }

    async fn spawn_server() -> SocketAddr {
        let mut app_config = Config::default();
        app_config.rate_limit.enabled = false;
        let config = ServerConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            static_dir: None,
            enable_cors: true,
            prune_interval_secs: 60,
            app: app_config,
        };
        let state = Arc::new(AppState::new(&config).unwrap());
        let app = create_app(state, &config);
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        addr
    }

    #[tokio::test]
    async fn test_validation() {
        let good = plan("http://127.0.0.1:5000".to_string(), Scenario::Stress, 1, 100);
        assert_eq!(good.validate().unwrap(), "http://127.0.0.1:5000");

        let mut bad = good.clone();
        bad.users = 0;
        assert!(run(&bad).await.is_err());

        let mut bad = good.clone();
        bad.spawn_rate = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = good.clone();
        bad.host = "ftp://example.com".to_string();
        assert!(bad.validate().is_err());

        let mut bad = good.clone();
        bad.duration = Duration::from_secs(u64::MAX);
        assert!(bad.validate().is_err());

        let mut bad = good;
        bad.host = "not a url".to_string();
        assert!(bad.validate().is_err());
    }

    #[tokio::test]
    async fn test_stress_run_against_local_server() {
        let addr = spawn_server().await;
        let report = run(&plan(format!("http://{}/", addr), Scenario::Stress, 3, 1000))
            .await
            .unwrap();
        assert_eq!(report.users, 3);
        assert!(report.total.count > 0);
        assert_eq!(report.total.failures, 0, "errors: {:?}", report.errors);
        assert_eq!(report.requests[0].name, "Stress Test Message");
    }

    #[tokio::test]
    async fn test_spike_bursts_hit_server() {
        let addr = spawn_server().await;
        let report = run(&plan(format!("http://{}", addr), Scenario::Spike, 1, 500))
            .await
            .unwrap();
        assert!(report.total.count >= 1);
        assert_eq!(report.total.failures, 0);
    }

    #[tokio::test]
    async fn test_unreachable_host_counts_failures() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let report = run(&plan(format!("http://{}", addr), Scenario::Endurance, 1, 300))
            .await
            .unwrap();
        assert!(report.total.count >= 1);
        assert_eq!(report.total.failures, report.total.count);
        assert!(report.errors.keys().any(|k| k.starts_with("Endurance Test")));
    }
}
