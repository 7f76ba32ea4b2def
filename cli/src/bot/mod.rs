//! # EduBot Engine
//!
//! File: cli/src/bot/mod.rs
//!
//! ## Overview
//!
//! The chatbot itself, independent of any transport. The HTTP server and the
//! terminal chat both drive the same pieces:
//!
//! - `topics`: keyword topic detection
//! - `conversation`: per-user three-step dialogue state
//! - `responder`: attaches knowledge-base widgets to a dialogue step
//! - `formatter`: HTML widget builders on top of the template registry
//! - `knowledge`: the static institutional knowledge base
//! - `autocomplete`, `context`, `rate_limit`, `analytics`: supporting services
//!
//! `Bot` bundles the shared services so a surface can hold a single `Arc`.
//!
pub mod analytics;
pub mod autocomplete;
pub mod context;
pub mod conversation;
pub mod formatter;
pub mod knowledge;
pub mod rate_limit;
pub mod responder;
pub mod similarity;
pub mod topics;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::templating::TemplateRegistry;
use analytics::Analytics;
use autocomplete::Autocomplete;
use chrono::Utc;
use context::{ContextMessage, ContextStore};
use conversation::{ConversationManager, FlowReply};
use formatter::HtmlFormatter;
use responder::ComposedReply;
use std::sync::Arc;
use std::time::Instant;
use topics::Topic;

/// One answered chat turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub flow: FlowReply,
    pub reply: ComposedReply,
    pub unanswered: bool,
    pub response_ms: f64,
}

/// All chatbot services, shared by every request handler.
#[derive(Debug)]
pub struct Bot {
    pub conversations: ConversationManager,
    pub formatter: HtmlFormatter,
    pub autocomplete: Autocomplete,
    pub contexts: ContextStore,
    pub analytics: Analytics,
}

impl Bot {
    pub fn new(config: &Config) -> Result<Self> {
        let templates = Arc::new(TemplateRegistry::new()?);
        Ok(Self {
            conversations: ConversationManager::new(&config.conversation),
            formatter: HtmlFormatter::new(templates),
            autocomplete: Autocomplete::new(&config.autocomplete),
            contexts: ContextStore::new(&config.context),
            analytics: Analytics::new(),
        })
    }

    /// Runs a message through the conversation, composes the answer and records it.
    pub fn answer(&self, session_id: &str, message: &str) -> Result<Turn> {
        let started = Instant::now();
        let flow = self.conversations.handle_message(session_id, message);
        self.finish_turn(session_id, message, flow, started)
    }

    /// Like [`Bot::answer`], but on an explicitly chosen topic (quick-action buttons).
    pub fn start(&self, session_id: &str, topic: Topic, message: &str) -> Result<Turn> {
        let started = Instant::now();
        let flow = self.conversations.start_conversation(session_id, topic, message);
        self.finish_turn(session_id, message, flow, started)
    }

    fn finish_turn(&self, session_id: &str, message: &str, flow: FlowReply, started: Instant) -> Result<Turn> {
        let reply = responder::compose_reply(&self.formatter, message, &flow)?;
        let unanswered = responder::is_unanswered(&flow, &reply);
        let response_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.autocomplete.add_to_history(message);
        self.analytics
            .record_message(session_id, message, flow.topic, response_ms, unanswered);
        let now = Utc::now();
        for (sender, text) in [("user", message), ("bot", flow.response.text.as_str())] {
            self.contexts.append_message(
                session_id,
                ContextMessage {
                    sender: sender.to_string(),
                    text: text.to_string(),
                    timestamp: Some(now),
                },
            );
        }
        Ok(Turn {
            flow,
            reply,
            unanswered,
            response_ms,
        })
    }

    /// Stores a rating for the session's conversation and counts it.
    pub fn feedback(&self, session_id: &str, rating: u8, comment: &str) -> Result<conversation::FeedbackAck> {
        let ack = self.conversations.collect_feedback(session_id, rating, comment)?;
        if ack.success {
            self.analytics.record_feedback(rating);
        }
        Ok(ack)
    }
}
