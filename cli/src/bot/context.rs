//! # Context Memory
//!
//! File: cli/src/bot/context.rs
//!
//! Client-supplied conversation context, kept per session so a browser can
//! restore its chat after a reload. Each entry holds arbitrary JSON plus a
//! message list capped at `max_messages` (oldest dropped). Entries not
//! touched within the context window are treated as gone: `load` removes
//! them on sight and `cleanup` sweeps them periodically.
//!
use crate::core::config::ContextSection;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "are", "was", "were", "be", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "can", "what", "when", "where", "who",
    "how",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub sender: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextEntry {
    pub session_id: String,
    pub context_data: Value,
    pub messages: Vec<ContextMessage>,
    pub message_count: usize,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub exists: bool,
    pub message_count: usize,
    pub user_messages: usize,
    pub bot_messages: usize,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct ContextStore {
    entries: RwLock<HashMap<String, ContextEntry>>,
    max_messages: usize,
    window: Duration,
}

impl ContextStore {
    pub fn new(settings: &ContextSection) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_messages: settings.max_messages,
            window: Duration::hours(settings.window_hours),
        }
    }

    /// Creates or replaces a session's context. `None` data keeps what was stored before.
    pub fn save(&self, session_id: &str, context_data: Option<Value>, mut messages: Vec<ContextMessage>) -> ContextEntry {
        if messages.len() > self.max_messages {
            messages.drain(..messages.len() - self.max_messages);
        }
        let now = Utc::now();
        for message in messages.iter_mut() {
            message.timestamp.get_or_insert(now);
        }

        let mut entries = self.entries.write();
        let entry = entries
            .entry(session_id.to_string())
            .or_insert_with(|| ContextEntry {
                session_id: session_id.to_string(),
                context_data: Value::Object(Default::default()),
                messages: Vec::new(),
                message_count: 0,
                last_active: now,
                created_at: now,
            });
        if let Some(data) = context_data {
            entry.context_data = data;
        }
        entry.message_count = messages.len();
        entry.messages = messages;
        entry.last_active = now;
        debug!("Saved context for session {} ({} messages)", session_id, entry.message_count);
        entry.clone()
    }

    pub fn load(&self, session_id: &str) -> Option<ContextEntry> {
        self.load_at(session_id, Utc::now())
    }

    /// Loads as of `now`: expired entries are deleted, live ones get `last_active = now`.
    pub fn load_at(&self, session_id: &str, now: DateTime<Utc>) -> Option<ContextEntry> {
        let mut entries = self.entries.write();
        let expired = entries.get(session_id)?.last_active < now - self.window;
        if expired {
            entries.remove(session_id);
            debug!("Context for session {} expired", session_id);
            return None;
        }
        let entry = entries.get_mut(session_id)?;
        entry.last_active = now;
        Some(entry.clone())
    }

    /// The last `limit` messages, oldest first.
    pub fn recent_messages(&self, session_id: &str, limit: usize) -> Vec<ContextMessage> {
        match self.load(session_id) {
            Some(entry) => {
                let skip = entry.messages.len().saturating_sub(limit);
                entry.messages.into_iter().skip(skip).collect()
            }
            None => Vec::new(),
        }
    }

    pub fn append_message(&self, session_id: &str, message: ContextMessage) -> ContextEntry {
        let (data, mut messages) = match self.load(session_id) {
            Some(entry) => (Some(entry.context_data), entry.messages),
            None => (None, Vec::new()),
        };
        messages.push(message);
        self.save(session_id, data, messages)
    }

    /// Removes a session's context. Returns whether one existed.
    pub fn clear(&self, session_id: &str) -> bool {
        self.entries.write().remove(session_id).is_some()
    }

    pub fn summary(&self, session_id: &str) -> ContextSummary {
        match self.load(session_id) {
            Some(entry) => {
                let count_by = |sender: &str| entry.messages.iter().filter(|m| m.sender == sender).count();
                ContextSummary {
                    exists: true,
                    message_count: entry.messages.len(),
                    user_messages: count_by("user"),
                    bot_messages: count_by("bot"),
                    last_active: Some(entry.last_active),
                    created_at: Some(entry.created_at),
                }
            }
            None => ContextSummary {
                exists: false,
                message_count: 0,
                user_messages: 0,
                bot_messages: 0,
                last_active: None,
                created_at: None,
            },
        }
    }

    /// Most frequent words of three or more letters, excluding stop words.
    pub fn keywords(&self, session_id: &str, top_n: usize) -> Vec<String> {
        let Some(entry) = self.load(session_id) else {
            return Vec::new();
        };
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for message in &entry.messages {
            for word in message.text.to_lowercase().split_whitespace() {
                let word = word.trim_matches(|c: char| !c.is_alphanumeric());
                if word.chars().count() < 3 || STOP_WORDS.contains(&word) {
                    continue;
                }
                let count = counts.entry(word.to_string()).or_insert(0);
                if *count == 0 {
                    order.push(word.to_string());
                }
                *count += 1;
            }
        }
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.truncate(top_n);
        order
    }

    /// Deletes every entry idle past the window. Returns how many were removed.
    pub fn cleanup(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.window;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.last_active >= cutoff);
        let removed = before - entries.len();
        if removed > 0 {
            info!("Cleaned up {} expired contexts", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> ContextStore {
        ContextStore::new(&ContextSection::default())
    }

    fn msg(sender: &str, text: &str) -> ContextMessage {
        ContextMessage {
            sender: sender.to_string(),
            text: text.to_string(),
            timestamp: None,
        }
    }

    #[test]
    fn test_save_and_load() {
        let s = store();
        s.save("s1", Some(json!({ "topic": "admissions" })), vec![msg("user", "hi")]);
        let entry = s.load("s1").unwrap();
        assert_eq!(entry.context_data["topic"], "admissions");
        assert_eq!(entry.message_count, 1);
        assert!(entry.messages[0].timestamp.is_some());
        assert!(s.load("missing").is_none());
    }

    #[test]
    fn test_save_caps_messages() {
        let s = ContextStore::new(&ContextSection {
            max_messages: 3,
            window_hours: 24,
        });
        let messages = (0..5).map(|i| msg("user", &format!("m{}", i))).collect();
        let entry = s.save("s", None, messages);
        assert_eq!(entry.message_count, 3);
        assert_eq!(entry.messages[0].text, "m2");
    }

    #[test]
    fn test_save_without_data_keeps_existing() {
        let s = store();
        s.save("s", Some(json!({ "k": 1 })), vec![]);
        let entry = s.save("s", None, vec![msg("bot", "hello")]);
        assert_eq!(entry.context_data["k"], 1);
    }

    #[test]
    fn test_load_expired_removes_entry() {
        let s = store();
        s.save("s", None, vec![msg("user", "hi")]);
        let later = Utc::now() + Duration::hours(25);
        assert!(s.load_at("s", later).is_none());
        assert!(s.is_empty());
    }

    #[test]
    fn test_load_refreshes_last_active() {
        let s = store();
        s.save("s", None, vec![]);
        let later = Utc::now() + Duration::hours(23);
        let entry = s.load_at("s", later).unwrap();
        assert_eq!(entry.last_active, later);
        // Still alive 23 hours after the refresh.
        assert!(s.load_at("s", later + Duration::hours(23)).is_some());
    }

    #[test]
    fn test_append_and_summary() {
        let s = store();
        s.append_message("s", msg("user", "What are the hostel fees?"));
        s.append_message("s", msg("bot", "Hostel fees are listed below"));
        s.append_message("s", msg("user", "hostel rooms"));
        let summary = s.summary("s");
        assert!(summary.exists);
        assert_eq!(summary.user_messages, 2);
        assert_eq!(summary.bot_messages, 1);
        assert_eq!(s.recent_messages("s", 2).len(), 2);
        assert_eq!(s.recent_messages("s", 2)[1].text, "hostel rooms");
        assert!(!s.summary("other").exists);
    }

    #[test]
    fn test_keywords() {
        let s = store();
        s.append_message("s", msg("user", "What are the hostel fees?"));
        s.append_message("s", msg("user", "Hostel rooms, please"));
        let keywords = s.keywords("s", 2);
        assert_eq!(keywords[0], "hostel");
        assert!(!keywords.contains(&"what".to_string()));
        assert!(s.keywords("none", 5).is_empty());
    }

    #[test]
    fn test_keywords_keep_three_letter_words() {
        let s = store();
        s.save("p", None, vec![msg("user", "fee fee lab, an ok job")]);
        let keywords = s.keywords("p", 5);
        assert_eq!(keywords, vec!["fee", "lab", "job"]);
    }

    #[test]
    fn test_clear_and_cleanup() {
        let s = store();
        s.save("a", None, vec![]);
        s.save("b", None, vec![]);
        assert!(s.clear("a"));
        assert!(!s.clear("a"));
        assert_eq!(s.cleanup(Utc::now()), 0);
        assert_eq!(s.cleanup(Utc::now() + Duration::hours(48)), 1);
        assert_eq!(s.len(), 0);
    }
}
