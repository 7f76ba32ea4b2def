//! # Conversation Manager
//!
//! File: cli/src/bot/conversation.rs
//!
//! ## Overview
//!
//! Tracks one conversation per user id and walks it through a short,
//! topic-specific decision tree:
//!
//! - **Step 1**: the topic's introduction plus four follow-up suggestions.
//! - **Step 2**: keyword branches (e.g. "eligibility" vs "apply" for admissions).
//! - **Step 3+**: a contextual answer that asks the user for a rating.
//!
//! All state lives in memory behind a single `parking_lot::RwLock`. Each
//! operation holds the write lock for its whole read-modify-write, so two
//! requests for the same session never lose a step increment. Conversations
//! idle for longer than the configured timeout are removed by `prune_idle`,
//! and history is capped per conversation.
//!
//! ## Examples
//!
//! ```rust
//! let manager = ConversationManager::new(&config.conversation);
//! let reply = manager.handle_message("guest-42", "Tell me about admissions");
//! assert_eq!(reply.topic, Topic::Admissions);
//! assert_eq!(reply.step, 1);
//! ```
//!
use crate::bot::formatter::HtmlFormatter;
use crate::bot::topics::{detect_topic, Topic};
use crate::core::config::ConversationSection;
use crate::core::error::{EdubotError, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything remembered about one user's conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub history: VecDeque<HistoryEntry>,
    pub context: BTreeMap<String, String>,
    pub current_topic: Option<Topic>,
    pub step: u32,
    pub started_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub satisfaction_rating: Option<u8>,
    pub feedback_comment: Option<String>,
    pub feedback_time: Option<DateTime<Utc>>,
    /// Messages ever exchanged, including entries dropped by the history cap.
    pub total_messages: usize,
}

impl Conversation {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            history: VecDeque::new(),
            context: BTreeMap::new(),
            current_topic: None,
            step: 0,
            started_at: now,
            last_active: now,
            satisfaction_rating: None,
            feedback_comment: None,
            feedback_time: None,
            total_messages: 0,
        }
    }

    fn push(&mut self, role: Role, message: &str, max_history: usize) {
        let now = Utc::now();
        self.history.push_back(HistoryEntry {
            role,
            message: message.to_string(),
            timestamp: now,
        });
        while self.history.len() > max_history {
            self.history.pop_front();
        }
        self.total_messages += 1;
        self.last_active = now;
    }
}

/// A canned answer produced by a topic handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowResponse {
    pub text: String,
    pub follow_up_questions: Vec<String>,
    pub requires_feedback: bool,
}

impl FlowResponse {
    fn new(text: &str, follow_ups: &[&str], requires_feedback: bool) -> Self {
        Self {
            text: text.to_string(),
            follow_up_questions: follow_ups.iter().map(|s| s.to_string()).collect(),
            requires_feedback,
        }
    }
}

/// The handler's answer together with where the conversation now stands.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReply {
    pub topic: Topic,
    pub step: u32,
    #[serde(flatten)]
    pub response: FlowResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackAck {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    pub text: String,
    pub is_feedback_request: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub topic: Option<Topic>,
    pub message_count: usize,
    pub started_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub satisfaction_rating: Option<u8>,
    pub context: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub pages: usize,
}

impl HistoryPage {
    fn empty(page: usize, per_page: usize) -> Self {
        Self {
            entries: Vec::new(),
            page,
            per_page,
            total: 0,
            pages: 0,
        }
    }
}

/// In-memory store of all active conversations.
#[derive(Debug)]
pub struct ConversationManager {
    conversations: RwLock<HashMap<String, Conversation>>,
    idle_timeout: Duration,
    max_history: usize,
}

impl ConversationManager {
    pub fn new(settings: &ConversationSection) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            idle_timeout: Duration::seconds(settings.idle_timeout_secs as i64),
            max_history: settings.max_history,
        }
    }

    /// Starts (or restarts) a conversation on `topic` at step 1.
    pub fn start_conversation(&self, user_id: &str, topic: Topic, query: &str) -> FlowReply {
        let mut conversations = self.conversations.write();
        self.start_locked(&mut conversations, user_id, topic, query)
    }

    /// Advances an existing conversation by one step.
    ///
    /// Unknown users get a fresh conversation on the topic detected from the
    /// message. A conversation still in `General` switches to a specific
    /// topic as soon as a message names one.
    pub fn continue_conversation(&self, user_id: &str, message: &str) -> FlowReply {
        let mut conversations = self.conversations.write();

        let current = conversations
            .get(user_id)
            .map(|c| c.current_topic.unwrap_or(Topic::General));
        let topic = match current {
            None => {
                return self.start_locked(&mut conversations, user_id, detect_topic(message), message)
            }
            Some(Topic::General) => {
                let detected = detect_topic(message);
                if detected != Topic::General {
                    debug!("Session {} moved from general to {}", user_id, detected);
                    return self.start_locked(&mut conversations, user_id, detected, message);
                }
                Topic::General
            }
            Some(topic) => topic,
        };

        let Some(conversation) = conversations.get_mut(user_id) else {
            return self.start_locked(&mut conversations, user_id, topic, message);
        };
        conversation.step += 1;
        conversation.push(Role::User, message, self.max_history);
        let step = conversation.step;
        let response = run_handler(conversation, topic, step, message);
        conversation.push(Role::Bot, &response.text, self.max_history);
        FlowReply {
            topic,
            step,
            response,
        }
    }

    /// Entry point used by the chat surfaces: continue if known, else start on the detected topic.
    pub fn handle_message(&self, user_id: &str, message: &str) -> FlowReply {
        self.continue_conversation(user_id, message)
    }

    fn start_locked(
        &self,
        conversations: &mut HashMap<String, Conversation>,
        user_id: &str,
        topic: Topic,
        query: &str,
    ) -> FlowReply {
        let conversation = conversations.entry(user_id.to_string()).or_insert_with(|| {
            info!("Starting conversation for session {}", user_id);
            Conversation::new(Utc::now())
        });
        conversation.current_topic = Some(topic);
        conversation.step = 1;
        conversation.push(Role::User, query, self.max_history);
        let response = run_handler(conversation, topic, 1, query);
        conversation.push(Role::Bot, &response.text, self.max_history);
        FlowReply {
            topic,
            step: 1,
            response,
        }
    }

    /// Records a 1-5 satisfaction rating for the user's conversation.
    pub fn collect_feedback(&self, user_id: &str, rating: u8, comment: &str) -> Result<FeedbackAck> {
        if !(1..=5).contains(&rating) {
            return Err(EdubotError::Validation(format!(
                "Rating must be between 1 and 5, got {}",
                rating
            ))
            .into());
        }
        let mut conversations = self.conversations.write();
        match conversations.get_mut(user_id) {
            Some(conversation) => {
                conversation.satisfaction_rating = Some(rating);
                conversation.feedback_comment = Some(comment.to_string());
                conversation.feedback_time = Some(Utc::now());
                info!("Session {} rated the conversation {}/5", user_id, rating);
                Ok(FeedbackAck {
                    success: true,
                    message: "Thank you for your feedback! It helps us improve.".to_string(),
                })
            }
            None => Ok(FeedbackAck {
                success: false,
                message: "No active conversation found".to_string(),
            }),
        }
    }

    pub fn summary(&self, user_id: &str) -> Option<ConversationSummary> {
        self.conversations.read().get(user_id).map(summarize)
    }

    /// All conversations as `(session id, summary)`, most recently active first.
    pub fn summaries(&self) -> Vec<(String, ConversationSummary)> {
        let mut all: Vec<(String, ConversationSummary)> = self
            .conversations
            .read()
            .iter()
            .map(|(id, c)| (id.clone(), summarize(c)))
            .collect();
        all.sort_by(|a, b| b.1.last_active.cmp(&a.1.last_active).then(a.0.cmp(&b.0)));
        all
    }

    /// One page of a user's history, oldest first. `page` is 1-based.
    pub fn history(&self, user_id: &str, page: usize, per_page: usize) -> HistoryPage {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let conversations = self.conversations.read();
        let Some(conversation) = conversations.get(user_id) else {
            return HistoryPage::empty(page, per_page);
        };
        let total = conversation.history.len();
        let entries = conversation
            .history
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();
        HistoryPage {
            entries,
            page,
            per_page,
            total,
            pages: total.div_ceil(per_page),
        }
    }

    /// Snapshot of every conversation keyed by session id.
    pub fn export(&self) -> BTreeMap<String, Conversation> {
        self.conversations
            .read()
            .iter()
            .map(|(id, c)| (id.clone(), c.clone()))
            .collect()
    }

    /// Drops conversations idle since before `now - idle_timeout`. Returns how many were removed.
    pub fn prune_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle_timeout;
        let mut conversations = self.conversations.write();
        let before = conversations.len();
        conversations.retain(|_, c| c.last_active >= cutoff);
        let removed = before - conversations.len();
        if removed > 0 {
            info!("Pruned {} idle conversations", removed);
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.conversations.read().len()
    }
}

/// The rating prompt appended once a conversation reaches step 3.
pub fn feedback_request(formatter: &HtmlFormatter) -> Result<FeedbackRequest> {
    Ok(FeedbackRequest {
        text: formatter.feedback_widget()?,
        is_feedback_request: true,
    })
}

fn summarize(conversation: &Conversation) -> ConversationSummary {
    ConversationSummary {
        topic: conversation.current_topic,
        message_count: conversation.history.len(),
        started_at: conversation.started_at,
        last_active: conversation.last_active,
        satisfaction_rating: conversation.satisfaction_rating,
        context: conversation.context.clone(),
    }
}

fn run_handler(conversation: &mut Conversation, topic: Topic, step: u32, message: &str) -> FlowResponse {
    match topic {
        Topic::NalandaInfo => nalanda_flow(conversation, step, message),
        Topic::Admissions => admissions_flow(conversation, step, message),
        Topic::Placements => intro_flow(
            conversation,
            step,
            "Let me share comprehensive placement information!",
            &[
                "Show placement statistics",
                "Which companies recruit?",
                "What is average package?",
                "How to prepare?",
            ],
        ),
        Topic::Courses => intro_flow(
            conversation,
            step,
            "I'll show you all available programs at Nalanda!",
            &["B.Tech programs", "M.Tech programs", "MBA programs", "Ph.D programs"],
        ),
        Topic::CampusLife => intro_flow(
            conversation,
            step,
            "Let me tell you about life at Nalanda campus!",
            &[
                "Hostel facilities",
                "Library and labs",
                "Sports and recreation",
                "Food and canteen",
            ],
        ),
        Topic::General => general_flow(),
    }
}

fn contextual_text(conversation: &Conversation) -> String {
    let interested_in = conversation
        .context
        .get("interested_in")
        .map(String::as_str)
        .unwrap_or("general");
    format!(
        "Based on our conversation about {}, here's more information...",
        interested_in
    )
}

fn contextual(conversation: &Conversation, step: u32) -> FlowResponse {
    FlowResponse {
        text: contextual_text(conversation),
        follow_up_questions: Vec::new(),
        requires_feedback: step >= 3,
    }
}

fn nalanda_flow(conversation: &mut Conversation, step: u32, message: &str) -> FlowResponse {
    let lowered = message.to_lowercase();
    match step {
        1 => FlowResponse::new(
            "Showing Nalanda Institute details...",
            &[
                "Tell me about admission process",
                "What are the placement statistics?",
                "Show me campus facilities",
                "What courses are offered?",
            ],
            false,
        ),
        2 if lowered.contains("admission") => {
            conversation
                .context
                .insert("interested_in".into(), "admissions".into());
            FlowResponse::new(
                "I see you're interested in admissions! Let me provide detailed information...",
                &[
                    "What are the eligibility criteria?",
                    "How to apply online?",
                    "What is the fee structure?",
                    "When do admissions open?",
                ],
                false,
            )
        }
        2 if lowered.contains("placement") => {
            conversation
                .context
                .insert("interested_in".into(), "placements".into());
            FlowResponse::new(
                "Great question about placements! Here are the details...",
                &[
                    "Which companies visit for placements?",
                    "What is the average package?",
                    "How to prepare for placements?",
                    "Any internship opportunities?",
                ],
                false,
            )
        }
        2 if lowered.contains("course") || lowered.contains("program") => FlowResponse::new(
            "Let me show you all available programs...",
            &[
                "Tell me about B.Tech CSE",
                "What specializations are available?",
                "What is the course fee?",
                "What about M.Tech programs?",
            ],
            false,
        ),
        2 => FlowResponse::new(
            "I can help you with more specific information!",
            &[
                "Admission process",
                "Placement details",
                "Course information",
                "Campus facilities",
            ],
            false,
        ),
        _ => FlowResponse {
            text: contextual_text(conversation),
            follow_up_questions: Vec::new(),
            requires_feedback: true,
        },
    }
}

fn admissions_flow(conversation: &mut Conversation, step: u32, message: &str) -> FlowResponse {
    let lowered = message.to_lowercase();
    match step {
        1 => FlowResponse::new(
            "I'll help you with the admission process for Nalanda Institute!",
            &[
                "What are the eligibility requirements?",
                "How to apply online?",
                "What documents are needed?",
                "What is the selection process?",
            ],
            false,
        ),
        2 if lowered.contains("eligibility") => FlowResponse::new(
            "Here are the eligibility criteria for different programs...",
            &[
                "B.Tech eligibility details",
                "M.Tech eligibility details",
                "MBA eligibility details",
                "What entrance exams are accepted?",
            ],
            false,
        ),
        2 if lowered.contains("apply") => FlowResponse::new(
            "Here's the step-by-step application process...",
            &[
                "How to create an account?",
                "What is the application fee?",
                "Important dates?",
                "Need help with form?",
            ],
            false,
        ),
        _ => contextual(conversation, step),
    }
}

fn intro_flow(conversation: &Conversation, step: u32, intro: &str, follow_ups: &[&str]) -> FlowResponse {
    if step == 1 {
        FlowResponse::new(intro, follow_ups, false)
    } else {
        contextual(conversation, step)
    }
}

fn general_flow() -> FlowResponse {
    FlowResponse::new(
        "I'm here to help! What would you like to know?",
        &[
            "About Nalanda College",
            "Admission process",
            "Placement details",
            "Campus facilities",
        ],
        false,
    )
}
