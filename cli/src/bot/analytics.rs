//! # Analytics
//!
//! File: cli/src/bot/analytics.rs
//!
//! In-process counters behind the admin dashboard: message volume per topic
//! and per session, hourly activity, response latency, satisfaction ratings
//! and the questions the bot could not place (knowledge gaps).
//!
use crate::bot::topics::Topic;
use chrono::{DateTime, Timelike, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// How many unanswered questions the dashboard keeps for review.
const RECENT_UNANSWERED: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct UnansweredQuery {
    pub session_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicCount {
    pub topic: Topic,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackStats {
    pub count: usize,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseTimeStats {
    pub samples: usize,
    pub min_ms: Option<f64>,
    pub avg_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_messages: usize,
    pub active_sessions: usize,
    pub tracked_sessions: usize,
    pub popular_topics: Vec<TopicCount>,
    pub unanswered_count: usize,
    pub recent_unanswered: Vec<UnansweredQuery>,
    pub feedback: FeedbackStats,
    pub response_time: ResponseTimeStats,
    pub hourly_activity: [usize; 24],
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,
    pub messages: usize,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub last_topic: Topic,
}

#[derive(Debug, Default)]
struct Counters {
    total_messages: usize,
    topics: HashMap<Topic, usize>,
    sessions: HashMap<String, SessionStats>,
    unanswered_count: usize,
    recent_unanswered: VecDeque<UnansweredQuery>,
    feedback_count: usize,
    rating_sum: u64,
    response_samples: usize,
    response_total_ms: f64,
    response_min_ms: Option<f64>,
    response_max_ms: Option<f64>,
    hourly: [usize; 24],
}

#[derive(Debug)]
pub struct Analytics {
    counters: Mutex<Counters>,
    started: Instant,
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}

impl Analytics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            started: Instant::now(),
        }
    }

    /// Records one answered chat message and how long it took to answer.
    pub fn record_message(&self, session_id: &str, message: &str, topic: Topic, response_ms: f64, unanswered: bool) {
        let now = Utc::now();
        let mut c = self.counters.lock();
        c.total_messages += 1;
        *c.topics.entry(topic).or_insert(0) += 1;
        c.hourly[now.hour() as usize] += 1;

        c.sessions
            .entry(session_id.to_string())
            .and_modify(|s| {
                s.messages += 1;
                s.last_seen = now;
                s.last_topic = topic;
            })
            .or_insert_with(|| SessionStats {
                session_id: session_id.to_string(),
                messages: 1,
                first_seen: now,
                last_seen: now,
                last_topic: topic,
            });

        c.response_samples += 1;
        c.response_total_ms += response_ms;
        c.response_min_ms = Some(c.response_min_ms.map_or(response_ms, |m| m.min(response_ms)));
        c.response_max_ms = Some(c.response_max_ms.map_or(response_ms, |m| m.max(response_ms)));

        if unanswered {
            c.unanswered_count += 1;
            c.recent_unanswered.push_back(UnansweredQuery {
                session_id: session_id.to_string(),
                message: message.to_string(),
                timestamp: now,
            });
            while c.recent_unanswered.len() > RECENT_UNANSWERED {
                c.recent_unanswered.pop_front();
            }
        }
    }

    pub fn record_feedback(&self, rating: u8) {
        let mut c = self.counters.lock();
        c.feedback_count += 1;
        c.rating_sum += u64::from(rating);
    }

    pub fn dashboard(&self, active_sessions: usize) -> Dashboard {
        let c = self.counters.lock();
        let mut popular_topics: Vec<TopicCount> = c
            .topics
            .iter()
            .map(|(topic, count)| TopicCount {
                topic: *topic,
                count: *count,
            })
            .collect();
        popular_topics.sort_by(|a, b| b.count.cmp(&a.count).then(a.topic.as_str().cmp(b.topic.as_str())));

        Dashboard {
            total_messages: c.total_messages,
            active_sessions,
            tracked_sessions: c.sessions.len(),
            popular_topics,
            unanswered_count: c.unanswered_count,
            recent_unanswered: c.recent_unanswered.iter().rev().cloned().collect(),
            feedback: FeedbackStats {
                count: c.feedback_count,
                average_rating: (c.feedback_count > 0)
                    .then(|| c.rating_sum as f64 / c.feedback_count as f64),
            },
            response_time: ResponseTimeStats {
                samples: c.response_samples,
                min_ms: c.response_min_ms,
                avg_ms: (c.response_samples > 0)
                    .then(|| c.response_total_ms / c.response_samples as f64),
                max_ms: c.response_max_ms,
            },
            hourly_activity: c.hourly,
            uptime_secs: self.uptime_secs(),
        }
    }

    /// The `limit` busiest sessions.
    pub fn user_stats(&self, limit: usize) -> Vec<SessionStats> {
        let c = self.counters.lock();
        let mut sessions: Vec<SessionStats> = c.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.messages.cmp(&a.messages).then(a.session_id.cmp(&b.session_id)));
        sessions.truncate(limit);
        sessions
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dashboard() {
        let a = Analytics::new();
        let d = a.dashboard(0);
        assert_eq!(d.total_messages, 0);
        assert!(d.feedback.average_rating.is_none());
        assert!(d.response_time.avg_ms.is_none());
        assert!(d.popular_topics.is_empty());
    }

    #[test]
    fn test_record_messages_and_topics() {
        let a = Analytics::new();
        a.record_message("s1", "fees?", Topic::Admissions, 10.0, false);
        a.record_message("s1", "apply?", Topic::Admissions, 30.0, false);
        a.record_message("s2", "hello", Topic::General, 20.0, true);
        let d = a.dashboard(2);
        assert_eq!(d.total_messages, 3);
        assert_eq!(d.popular_topics[0].topic, Topic::Admissions);
        assert_eq!(d.popular_topics[0].count, 2);
        assert_eq!(d.unanswered_count, 1);
        assert_eq!(d.recent_unanswered[0].message, "hello");
        assert_eq!(d.response_time.min_ms, Some(10.0));
        assert_eq!(d.response_time.max_ms, Some(30.0));
        assert_eq!(d.response_time.avg_ms, Some(20.0));
        assert_eq!(d.hourly_activity.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_feedback_average() {
        let a = Analytics::new();
        a.record_feedback(5);
        a.record_feedback(4);
        assert_eq!(a.dashboard(0).feedback.average_rating, Some(4.5));
    }

    #[test]
    fn test_unanswered_window() {
        let a = Analytics::new();
        for i in 0..60 {
            a.record_message("s", &format!("q{}", i), Topic::General, 1.0, true);
        }
        let d = a.dashboard(1);
        assert_eq!(d.unanswered_count, 60);
        assert_eq!(d.recent_unanswered.len(), RECENT_UNANSWERED);
        assert_eq!(d.recent_unanswered[0].message, "q59");
    }

    #[test]
    fn test_user_stats_sorted() {
        let a = Analytics::new();
        a.record_message("quiet", "hi", Topic::General, 1.0, false);
        for _ in 0..3 {
            a.record_message("busy", "hostel", Topic::CampusLife, 1.0, false);
        }
        let users = a.user_stats(10);
        assert_eq!(users[0].session_id, "busy");
        assert_eq!(users[0].messages, 3);
        assert_eq!(users[0].last_topic, Topic::CampusLife);
        assert_eq!(a.user_stats(1).len(), 1);
    }
}
