//! # Rate Limiter
//!
//! File: cli/src/bot/rate_limit.rs
//!
//! ## Overview
//!
//! Sliding-window request limiting per identifier (client address or session
//! id). Every allowed request is timestamped; a new request is denied when
//! the number of timestamps inside the last minute, hour or day has reached
//! the corresponding limit. Denied requests are not recorded, so a client
//! that backs off recovers as soon as old timestamps age out.
//!
//! Identifiers can also be blocked outright or given custom limits. Every
//! denial and block is appended to a bounded violation log.
//!
use crate::core::config::RateLimitSection;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{info, warn};

const MAX_VIOLATIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub per_minute: usize,
    pub per_hour: usize,
    pub per_day: usize,
}

impl From<&RateLimitSection> for Limits {
    fn from(settings: &RateLimitSection) -> Self {
        Self {
            per_minute: settings.requests_per_minute,
            per_hour: settings.requests_per_hour,
            per_day: settings.requests_per_day,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Minute,
    Hour,
    Day,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Minute => "minute",
            Period::Hour => "hour",
            Period::Day => "day",
        }
    }

    pub fn seconds(self) -> u64 {
        match self {
            Period::Minute => 60,
            Period::Hour => 3_600,
            Period::Day => 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub minute: usize,
    pub hour: usize,
    pub day: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Decision {
    Allowed {
        remaining: Remaining,
    },
    Denied {
        reason: String,
        period: Option<Period>,
        limit: Option<usize>,
        current: Option<usize>,
        /// Seconds until a retry may succeed; `None` for blocked identifiers.
        retry_after: Option<u64>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub identifier: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentifierUsage {
    pub identifier: String,
    pub requests: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub total_identifiers: usize,
    pub total_requests: usize,
    pub blocked_count: usize,
    pub custom_limits_count: usize,
    pub top_users: Vec<IdentifierUsage>,
}

#[derive(Debug, Default)]
struct State {
    requests: HashMap<String, VecDeque<DateTime<Utc>>>,
    blocked: HashSet<String>,
    custom: HashMap<String, Limits>,
    violations: VecDeque<Violation>,
}

impl State {
    fn log_violation(&mut self, identifier: &str, detail: String, now: DateTime<Utc>) {
        self.violations.push_back(Violation {
            identifier: identifier.to_string(),
            detail,
            timestamp: now,
        });
        while self.violations.len() > MAX_VIOLATIONS {
            self.violations.pop_front();
        }
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<State>,
    defaults: Limits,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSection) -> Self {
        Self {
            state: Mutex::new(State::default()),
            defaults: Limits::from(settings),
            enabled: settings.enabled,
        }
    }

    pub fn check(&self, identifier: &str) -> Decision {
        self.check_at(identifier, Utc::now())
    }

    /// Decides whether `identifier` may make a request at `now`, recording it if so.
    pub fn check_at(&self, identifier: &str, now: DateTime<Utc>) -> Decision {
        let mut state = self.state.lock();
        if state.blocked.contains(identifier) {
            return Decision::Denied {
                reason: "Identifier is blocked".to_string(),
                period: None,
                limit: None,
                current: None,
                retry_after: None,
            };
        }
        let limits = state.custom.get(identifier).copied().unwrap_or(self.defaults);
        if !self.enabled {
            return Decision::Allowed {
                remaining: Remaining {
                    minute: limits.per_minute,
                    hour: limits.per_hour,
                    day: limits.per_day,
                },
            };
        }

        let timestamps = state.requests.entry(identifier.to_string()).or_default();
        let day_ago = now - Duration::days(1);
        while timestamps.front().is_some_and(|ts| *ts <= day_ago) {
            timestamps.pop_front();
        }
        let within = |d: Duration| timestamps.iter().filter(|ts| **ts > now - d).count();
        let minute = within(Duration::minutes(1));
        let hour = within(Duration::hours(1));
        let day = timestamps.len();

        let exceeded = [
            (Period::Minute, minute, limits.per_minute),
            (Period::Hour, hour, limits.per_hour),
            (Period::Day, day, limits.per_day),
        ]
        .into_iter()
        .find(|(_, current, limit)| current >= limit);

        if let Some((period, current, limit)) = exceeded {
            let reason = format!("Rate limit exceeded (per {})", period.as_str());
            warn!("{} for {}: {}/{}", reason, identifier, current, limit);
            state.log_violation(identifier, format!("{} ({}/{})", reason, current, limit), now);
            return Decision::Denied {
                reason,
                period: Some(period),
                limit: Some(limit),
                current: Some(current),
                retry_after: Some(period.seconds()),
            };
        }

        timestamps.push_back(now);
        Decision::Allowed {
            remaining: Remaining {
                minute: limits.per_minute - minute - 1,
                hour: limits.per_hour - hour - 1,
                day: limits.per_day - day - 1,
            },
        }
    }

    pub fn set_custom_limit(&self, identifier: &str, limits: Limits) {
        self.state.lock().custom.insert(identifier.to_string(), limits);
    }

    pub fn remove_custom_limit(&self, identifier: &str) {
        self.state.lock().custom.remove(identifier);
    }

    pub fn block(&self, identifier: &str, reason: Option<&str>) {
        let mut state = self.state.lock();
        state.blocked.insert(identifier.to_string());
        let detail = format!("blocked: {}", reason.unwrap_or("Manual block"));
        state.log_violation(identifier, detail, Utc::now());
        info!("Blocked {}", identifier);
    }

    pub fn unblock(&self, identifier: &str) {
        self.state.lock().blocked.remove(identifier);
    }

    /// Violations newest first.
    pub fn violations(&self, limit: usize) -> Vec<Violation> {
        self.state.lock().violations.iter().rev().take(limit).cloned().collect()
    }

    pub fn usage_stats(&self) -> UsageStats {
        let state = self.state.lock();
        let mut top_users: Vec<IdentifierUsage> = state
            .requests
            .iter()
            .filter(|(_, ts)| !ts.is_empty())
            .map(|(id, ts)| IdentifierUsage {
                identifier: id.clone(),
                requests: ts.len(),
            })
            .collect();
        top_users.sort_by(|a, b| b.requests.cmp(&a.requests).then(a.identifier.cmp(&b.identifier)));
        let total_requests = top_users.iter().map(|u| u.requests).sum();
        let total_identifiers = top_users.len();
        top_users.truncate(10);
        UsageStats {
            total_identifiers,
            total_requests,
            blocked_count: state.blocked.len(),
            custom_limits_count: state.custom.len(),
            top_users,
        }
    }

    /// Drops timestamps older than a day and forgets idle identifiers.
    pub fn prune(&self, now: DateTime<Utc>) {
        let day_ago = now - Duration::days(1);
        let mut state = self.state.lock();
        state.requests.retain(|_, ts| {
            ts.retain(|t| *t > day_ago);
            !ts.is_empty()
        });
    }
}
