//! # Load Test Scenarios
//!
//! File: cli/src/commands/loadtest/scenarios.rs
//!
//! Each scenario is a class of simulated user: a weighted set of tasks and a
//! think-time range slept between tasks. A task expands to one or more HTTP
//! requests; requests carry a display name that groups them in the report.
//!
use clap::ValueEnum;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

const CHATBOT_MESSAGES: &[&str] = &[
    "Hello",
    "What courses do you offer?",
    "Tell me about Python programming",
    "What are the admission requirements?",
    "How do I register?",
    "What is the fee structure?",
    "Tell me about scholarships",
    "What is machine learning?",
    "Explain artificial intelligence",
    "How can I contact support?",
];

const GUEST_MESSAGES: &[&str] = &["Hello", "What can you help me with?", "Tell me about your services"];

const AUTOCOMPLETE_PREFIXES: &[&str] = &["wha", "how", "tel", "exp"];

const CONTEXT_TOPICS: &[&str] = &["courses", "admission", "fees"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Students chatting, autocompleting and saving context.
    Chatbot,
    /// Staff polling the dashboard and exports.
    Admin,
    /// Anonymous visitors browsing pages and asking a few questions.
    Guest,
    /// Even mix of chat, autocomplete and context calls.
    Api,
    /// Rapid-fire messages on one shared session.
    Stress,
    /// Bursts of five sequential messages.
    Spike,
    /// Sustained steady chat traffic.
    Endurance,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::Chatbot => "chatbot",
            Scenario::Admin => "admin",
            Scenario::Guest => "guest",
            Scenario::Api => "api",
            Scenario::Stress => "stress",
            Scenario::Spike => "spike",
            Scenario::Endurance => "endurance",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    SendMessage,
    Autocomplete,
    ChatHistory,
    SaveContext,
    GetContext,
    ViewAnalytics,
    ViewConversations,
    UserStats,
    ExportData,
    GuestMessage,
    HomePage,
    AboutPage,
    ChatPerformance,
    AutocompletePerformance,
    ContextPerformance,
    RapidFire,
    SpikeBurst,
    Sustained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One HTTP call a virtual user makes.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub name: &'static str,
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    fn get(name: &'static str, path: impl Into<String>) -> Self {
        Self {
            name,
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    fn post(name: &'static str, path: impl Into<String>, body: Value) -> Self {
        Self {
            name,
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

impl Scenario {
    /// Tasks with their relative weights.
    pub fn tasks(self) -> &'static [(Task, u32)] {
        match self {
            Scenario::Chatbot => &[
                (Task::SendMessage, 10),
                (Task::Autocomplete, 3),
                (Task::ChatHistory, 2),
                (Task::SaveContext, 1),
                (Task::GetContext, 1),
            ],
            Scenario::Admin => &[
                (Task::ViewAnalytics, 5),
                (Task::ViewConversations, 3),
                (Task::UserStats, 2),
                (Task::ExportData, 1),
            ],
            Scenario::Guest => &[(Task::GuestMessage, 10), (Task::HomePage, 5), (Task::AboutPage, 2)],
            Scenario::Api => &[
                (Task::ChatPerformance, 1),
                (Task::AutocompletePerformance, 1),
                (Task::ContextPerformance, 1),
            ],
            Scenario::Stress => &[(Task::RapidFire, 1)],
            Scenario::Spike => &[(Task::SpikeBurst, 1)],
            Scenario::Endurance => &[(Task::Sustained, 1)],
        }
    }

    /// Think time between tasks, in seconds.
    pub fn think_time(self) -> (f64, f64) {
        match self {
            Scenario::Chatbot => (1.0, 3.0),
            Scenario::Admin => (3.0, 7.0),
            Scenario::Guest => (2.0, 5.0),
            Scenario::Api => (0.5, 2.0),
            Scenario::Stress => (0.1, 0.5),
            Scenario::Spike => (0.1, 1.0),
            Scenario::Endurance => (1.0, 2.0),
        }
    }

    /// Session id a new virtual user of this class chats under.
    pub fn session_id(self, user_number: usize, rng: &mut fastrand::Rng) -> String {
        match self {
            Scenario::Chatbot => format!("load-test-{}-{}", user_number, rng.u32(1000..=9999)),
            Scenario::Guest => format!("guest-{}", rng.u32(1000..=9999)),
            Scenario::Stress => "stress-test".to_string(),
            Scenario::Spike => "spike-test".to_string(),
            Scenario::Endurance => "endurance-test".to_string(),
            Scenario::Admin | Scenario::Api => format!("{}-{}", self, user_number),
        }
    }

    /// Weighted random task choice.
    pub fn pick_task(self, rng: &mut fastrand::Rng) -> Task {
        let tasks = self.tasks();
        let total: u32 = tasks.iter().map(|(_, w)| w).sum();
        let mut roll = rng.u32(0..total);
        for (task, weight) in tasks {
            if roll < *weight {
                return *task;
            }
            roll -= weight;
        }
        tasks[0].0
    }

    /// Sleep duration drawn uniformly from the think-time range.
    pub fn think(self, rng: &mut fastrand::Rng) -> f64 {
        let (min, max) = self.think_time();
        min + rng.f64() * (max - min)
    }
}

impl Task {
    /// The requests this task performs, in order.
    pub fn requests(self, session_id: &str, rng: &mut fastrand::Rng) -> Vec<Request> {
        let pick = |rng: &mut fastrand::Rng, list: &[&'static str]| list[rng.usize(0..list.len())];
        match self {
            Task::SendMessage => vec![Request::post(
                "Send Chat Message",
                "/api/chat",
                json!({ "message": pick(rng, CHATBOT_MESSAGES), "session_id": session_id }),
            )],
            Task::Autocomplete => vec![Request::get(
                "Get Autocomplete",
                format!("/api/autocomplete?q={}&limit=5", pick(rng, AUTOCOMPLETE_PREFIXES)),
            )],
            Task::ChatHistory => vec![Request::get(
                "Get Chat History",
                format!("/api/chat/history?session_id={}", session_id),
            )],
            Task::SaveContext => vec![Request::post(
                "Save Context",
                "/api/context/save",
                json!({
                    "session_id": session_id,
                    "context_data": { "topic": pick(rng, CONTEXT_TOPICS), "intent": "inquiry" },
                }),
            )],
            Task::GetContext => vec![Request::get("Get Context", format!("/api/context/{}", session_id))],
            Task::ViewAnalytics => vec![Request::get("View Analytics", "/api/analytics/dashboard")],
            Task::ViewConversations => vec![Request::get("View All Conversations", "/api/admin/conversations")],
            Task::UserStats => vec![Request::get("Get User Stats", "/api/analytics/users")],
            Task::ExportData => vec![Request::get("Export Data", "/api/admin/export")],
            Task::GuestMessage => vec![Request::post(
                "Guest Send Message",
                "/api/chat",
                json!({ "message": pick(rng, GUEST_MESSAGES), "session_id": session_id }),
            )],
            Task::HomePage => vec![Request::get("View Home Page", "/")],
            Task::AboutPage => vec![Request::get("View About Page", "/about")],
            Task::ChatPerformance => vec![Request::post(
                "Chat API Performance",
                "/api/chat",
                json!({
                    "message": "Performance test message",
                    "session_id": format!("perf-{}", rng.u32(1..=100)),
                }),
            )],
            Task::AutocompletePerformance => vec![Request::get(
                "Autocomplete Performance",
                "/api/autocomplete?q=test&limit=10",
            )],
            Task::ContextPerformance => vec![Request::post(
                "Context Save Performance",
                "/api/context/save",
                json!({
                    "session_id": format!("perf-{}", rng.u32(1..=100)),
                    "context_data": { "test": "data" },
                }),
            )],
            Task::RapidFire => vec![Request::post(
                "Stress Test Message",
                "/api/chat",
                json!({
                    "message": format!("Stress test {}", rng.u32(1..=10000)),
                    "session_id": session_id,
                }),
            )],
            Task::SpikeBurst => (0..5)
                .map(|_| {
                    Request::post(
                        "Spike Test",
                        "/api/chat",
                        json!({ "message": "Spike test", "session_id": session_id }),
                    )
                })
                .collect(),
            Task::Sustained => vec![Request::post(
                "Endurance Test",
                "/api/chat",
                json!({ "message": "Endurance test message", "session_id": session_id }),
            )],
        }
    }
}
