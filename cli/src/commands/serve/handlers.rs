//! # EduBot HTTP Handlers
//!
//! File: cli/src/commands/serve/handlers.rs
//!
//! ## Overview
//!
//! Axum handlers for every route of `edubot serve`, plus the JSON envelope
//! and the `ApiError` type that maps failures onto HTTP status codes.
//!
//! Every JSON response uses one of two shapes:
//!
//! ```json
//! { "status": "success", "message": "...", "data": { ... } }
//! { "status": "error", "message": "..." }
//! ```
//!
use super::server_logic::AppState;
use crate::bot::context::ContextMessage;
use crate::bot::knowledge;
use crate::bot::Turn;
use crate::bot::rate_limit::{Decision, Limits};
use crate::bot::topics::Topic;
use crate::core::error::EdubotError;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Longest chat message accepted.
const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{reason}")]
    RateLimited { reason: String, retry_after: Option<u64> },

    #[error("{0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<EdubotError>() {
            Some(EdubotError::Validation(msg)) => ApiError::BadRequest(msg.clone()),
            Some(e @ EdubotError::SessionNotFound { .. }) | Some(e @ EdubotError::UnknownSection { .. }) => {
                ApiError::NotFound(e.to_string())
            }
            _ => {
                error!("Request failed: {:#}", err);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "status": "error", "message": self.to_string() }));
        let mut response = (status, body).into_response();
        if let ApiError::RateLimited {
            retry_after: Some(secs),
            ..
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Success envelope.
fn success<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({ "status": "success", "message": message, "data": data }))
}

// --- Pages ---

pub async fn chat_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let html = state.bot.formatter.templates().render(
        "chat_page.html",
        &json!({
            "title": "EduBot",
            "tagline": format!("Your assistant for {}", knowledge::COLLEGE_INFO.name),
        }),
    )?;
    Ok(Html(html))
}

pub async fn about_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let f = &state.bot.formatter;
    let info = &knowledge::COLLEGE_INFO;
    let stats: Vec<(String, &str)> = info
        .statistics
        .iter()
        .map(|(k, v)| (k.replace('_', " "), *v))
        .collect();
    let body = [
        f.badge(info.accreditation, "success")?,
        f.section("Location", &f.key_value(&info.location.0.to_vec())?, Some("📍"), false)?,
        f.section("Contact", &f.key_value(&info.contact.0.to_vec())?, Some("📞"), false)?,
        f.section("At a glance", &f.key_value(&stats)?, Some("📊"), false)?,
    ]
    .join("\n");
    let html = f
        .templates()
        .render("about_page.html", &json!({ "name": info.name, "body": body }))?;
    Ok(Html(html))
}

// --- Health ---

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    success(
        "EduBot is running",
        json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": state.bot.analytics.uptime_secs(),
            "active_sessions": state.bot.conversations.session_count(),
        }),
    )
}

// --- Chat ---

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
}

/// Rate-limit key: forwarded client address, else the session, else a shared bucket.
fn client_identifier(headers: &HeaderMap, session_id: Option<&str>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| session_id.map(String::from))
        .unwrap_or_else(|| "anonymous".to_string())
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message required".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message is longer than {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    let identifier = client_identifier(&headers, req.session_id.as_deref());
    match state.rate_limiter.check(&identifier) {
        Decision::Denied {
            reason, retry_after, ..
        } => return Err(ApiError::RateLimited { reason, retry_after }),
        Decision::Allowed { remaining } => {
            debug!("{} has {} requests left this minute", identifier, remaining.minute)
        }
    }

    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("guest-{}", Uuid::new_v4()));
    let turn = state.bot.answer(&session_id, message)?;
    Ok(turn_response(&session_id, message, &turn))
}

fn turn_response(session_id: &str, message: &str, turn: &Turn) -> Json<Value> {
    success(
        "Response generated",
        json!({
            "session_id": session_id,
            "message": message,
            "response": turn.reply.html,
            "text": turn.flow.response.text,
            "topic": turn.flow.topic,
            "step": turn.flow.step,
            "intent": turn.reply.intent,
            "follow_up_questions": turn.flow.response.follow_up_questions,
            "requires_feedback": turn.flow.response.requires_feedback,
            "response_ms": turn.response_ms,
            "timestamp": Utc::now(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    20
}

pub async fn chat_history(State(state): State<Arc<AppState>>, Query(q): Query<HistoryQuery>) -> Json<Value> {
    let session_id = q.session_id.as_deref().unwrap_or_default();
    success(
        "History retrieved",
        state.bot.conversations.history(session_id, q.page, q.per_page),
    )
}

// --- Feedback ---

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub session_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

pub async fn feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;
    let ack = state.bot.feedback(&req.session_id, req.rating, &req.comment)?;
    if !ack.success {
        return Err(ApiError::NotFound(ack.message));
    }
    Ok(success(&ack.message, json!({ "session_id": req.session_id, "rating": req.rating })))
}

pub async fn feedback_request(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let request = crate::bot::conversation::feedback_request(&state.bot.formatter)?;
    Ok(success("Feedback requested", request))
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub session_id: Option<String>,
    pub topic: String,
    #[serde(default)]
    pub message: String,
}

/// Starts a conversation on a chosen topic, as the quick-action buttons do.
pub async fn conversation_start(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;
    let topic: Topic = req.topic.parse().map_err(anyhow::Error::from)?;
    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("guest-{}", Uuid::new_v4()));
    let message = match req.message.trim() {
        "" => topic.as_str().replace('_', " "),
        text => text.to_string(),
    };
    let turn = state.bot.start(&session_id, topic, &message)?;
    Ok(turn_response(&session_id, &message, &turn))
}

pub async fn conversation_summary(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let summary = state
        .bot
        .conversations
        .summary(&session_id)
        .ok_or_else(|| anyhow::Error::from(EdubotError::SessionNotFound { session_id }))?;
    Ok(success("Summary retrieved", summary))
}

// --- Autocomplete ---

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

pub async fn autocomplete(State(state): State<Arc<AppState>>, Query(q): Query<AutocompleteQuery>) -> Json<Value> {
    let suggestions = state.bot.autocomplete.suggestions(&q.q, q.limit.min(20));
    success("Suggestions retrieved", json!({ "query": q.q, "suggestions": suggestions }))
}

pub async fn autocomplete_trending(State(state): State<Arc<AppState>>, Query(q): Query<LimitQuery>) -> Json<Value> {
    success("Trending retrieved", json!({ "trending": state.bot.autocomplete.trending(q.limit) }))
}

pub async fn autocomplete_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Json<Value> {
    let suggestions = state.bot.autocomplete.category_suggestions(&category, q.limit);
    success(
        "Category suggestions retrieved",
        json!({ "category": category, "suggestions": suggestions }),
    )
}

pub async fn autocomplete_clear(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.bot.autocomplete.clear_history();
    info!("Autocomplete history cleared");
    success("History cleared", json!({}))
}

// --- Context ---

#[derive(Debug, Deserialize)]
pub struct ContextSaveRequest {
    pub session_id: String,
    pub context_data: Option<Value>,
    #[serde(default)]
    pub messages: Vec<ContextMessage>,
}

pub async fn context_save(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContextSaveRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;
    if req.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest("session_id required".to_string()));
    }
    let entry = state.bot.contexts.save(&req.session_id, req.context_data, req.messages);
    Ok(success(
        "Context saved",
        json!({ "session_id": entry.session_id, "message_count": entry.message_count }),
    ))
}

pub async fn context_load(State(state): State<Arc<AppState>>, Path(session_id): Path<String>) -> ApiResult<Json<Value>> {
    let entry = state
        .bot
        .contexts
        .load(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("No context found for session '{}'", session_id)))?;
    let summary = state.bot.contexts.summary(&session_id);
    let keywords = state.bot.contexts.keywords(&session_id, 10);
    let recent = state.bot.contexts.recent_messages(&session_id, 5);
    Ok(success(
        "Context loaded",
        json!({ "context": entry, "summary": summary, "keywords": keywords, "recent_messages": recent }),
    ))
}

pub async fn context_clear(State(state): State<Arc<AppState>>, Path(session_id): Path<String>) -> Json<Value> {
    let cleared = state.bot.contexts.clear(&session_id);
    success("Context cleared", json!({ "session_id": session_id, "existed": cleared }))
}

// --- Knowledge base ---

#[derive(Debug, Deserialize)]
pub struct SectionQuery {
    #[serde(default = "default_section")]
    pub section: String,
}

fn default_section() -> String {
    "all".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn knowledge_section(Query(q): Query<SectionQuery>) -> ApiResult<Json<Value>> {
    let data = knowledge::section(&q.section).ok_or_else(|| {
        anyhow::Error::from(EdubotError::UnknownSection {
            name: q.section.clone(),
        })
    })?;
    Ok(success("Knowledge retrieved", json!({ "section": q.section, "data": data })))
}

pub async fn knowledge_search(Query(q): Query<SearchQuery>) -> ApiResult<Json<Value>> {
    let keywords: Vec<&str> = q.q.split_whitespace().collect();
    if keywords.is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'q' required".to_string()));
    }
    let results = knowledge::search(&keywords);
    Ok(success("Search complete", json!({ "query": q.q, "results": results })))
}

// --- Analytics & admin ---

pub async fn analytics_dashboard(State(state): State<Arc<AppState>>) -> Json<Value> {
    let dashboard = state.bot.analytics.dashboard(state.bot.conversations.session_count());
    success(
        "Dashboard retrieved",
        json!({
            "dashboard": dashboard,
            "rate_limit": state.rate_limiter.usage_stats(),
            "autocomplete": state.bot.autocomplete.stats(),
            "contexts": state.bot.contexts.len(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    #[serde(default = "default_users_limit")]
    pub limit: usize,
}

fn default_users_limit() -> usize {
    50
}

pub async fn analytics_users(State(state): State<Arc<AppState>>, Query(q): Query<UsersQuery>) -> Json<Value> {
    success("User stats retrieved", json!({ "users": state.bot.analytics.user_stats(q.limit) }))
}

pub async fn admin_conversations(State(state): State<Arc<AppState>>) -> Json<Value> {
    let conversations: Vec<Value> = state
        .bot
        .conversations
        .summaries()
        .into_iter()
        .map(|(id, summary)| json!({ "session_id": id, "summary": summary }))
        .collect();
    success(
        "Conversations retrieved",
        json!({ "total": conversations.len(), "conversations": conversations }),
    )
}

pub async fn admin_export(State(state): State<Arc<AppState>>) -> Json<Value> {
    let conversations = state.bot.conversations.export();
    warn!("Exporting {} conversations", conversations.len());
    success(
        "Export complete",
        json!({ "exported_at": Utc::now(), "conversations": conversations }),
    )
}

// --- Rate limit administration ---

pub async fn rate_limit_stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    success("Rate limit stats retrieved", state.rate_limiter.usage_stats())
}

#[derive(Debug, Deserialize)]
pub struct ViolationsQuery {
    #[serde(default = "default_users_limit")]
    pub limit: usize,
}

pub async fn rate_limit_violations(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViolationsQuery>,
) -> Json<Value> {
    let violations = state.rate_limiter.violations(q.limit);
    success(
        "Violations retrieved",
        json!({ "count": violations.len(), "violations": violations }),
    )
}

#[derive(Debug, Deserialize)]
pub struct LimitsBody {
    pub requests_per_minute: usize,
    pub requests_per_hour: usize,
    pub requests_per_day: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetLimitRequest {
    #[serde(default)]
    pub identifier: String,
    pub limits: LimitsBody,
}

fn required_identifier(identifier: &str) -> ApiResult<String> {
    match identifier.trim() {
        "" => Err(ApiError::BadRequest("Identifier required".to_string())),
        id => Ok(id.to_string()),
    }
}

pub async fn rate_limit_set(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetLimitRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;
    let identifier = required_identifier(&req.identifier)?;
    let limits = Limits {
        per_minute: req.limits.requests_per_minute,
        per_hour: req.limits.requests_per_hour,
        per_day: req.limits.requests_per_day,
    };
    state.rate_limiter.set_custom_limit(&identifier, limits);
    info!("Custom rate limit for {}: {:?}", identifier, limits);
    Ok(success(
        "Custom limit set successfully",
        json!({ "identifier": identifier, "limits": limits }),
    ))
}

pub async fn rate_limit_remove(State(state): State<Arc<AppState>>, Path(identifier): Path<String>) -> Json<Value> {
    state.rate_limiter.remove_custom_limit(&identifier);
    success("Custom limit removed", json!({ "identifier": identifier }))
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    #[serde(default, alias = "ip")]
    pub identifier: String,
    pub reason: Option<String>,
}

pub async fn rate_limit_block(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BlockRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;
    let identifier = required_identifier(&req.identifier)?;
    let reason = req.reason.as_deref().unwrap_or("Manual block by admin");
    state.rate_limiter.block(&identifier, Some(reason));
    Ok(success(
        "Identifier blocked successfully",
        json!({ "identifier": identifier, "reason": reason }),
    ))
}

pub async fn rate_limit_unblock(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BlockRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;
    let identifier = required_identifier(&req.identifier)?;
    state.rate_limiter.unblock(&identifier);
    Ok(success(
        "Identifier unblocked successfully",
        json!({ "identifier": identifier }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_identifier_precedence() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_identifier(&headers, None), "anonymous");
        assert_eq!(client_identifier(&headers, Some("s1")), "s1");
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 172.16.0.1"));
        assert_eq!(client_identifier(&headers, Some("s1")), "10.0.0.7");
    }

    #[test]
    fn test_api_error_from_validation() {
        let err: anyhow::Error = EdubotError::Validation("bad rating".to_string()).into();
        match ApiError::from(err) {
            ApiError::BadRequest(msg) => assert_eq!(msg, "bad rating"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rate_limited_response_sets_retry_after() {
        let response = ApiError::RateLimited {
            reason: "Rate limit exceeded (per minute)".to_string(),
            retry_after: Some(60),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    }
}
