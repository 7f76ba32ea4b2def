//! # EduBot Server Logic
//!
//! File: cli/src/commands/serve/server_logic.rs
//!
//! ## Overview
//!
//! Builds the axum router, binds a listener (moving to the next port when the
//! requested one is taken), runs a background task that prunes idle state, and
//! shuts down gracefully on Ctrl+C or SIGTERM.
//!
//! ## Architecture
//!
//! All handlers share one `Arc<AppState>`. The state owns the chatbot services
//! (`Bot`) and the rate limiter; each service guards its own data, so no
//! handler holds a lock across an `.await`.
//!
use super::config::ServerConfig;
use super::handlers;
use super::utils;
use crate::bot::rate_limit::RateLimiter;
use crate::bot::Bot;
use crate::core::error::Result;
use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, error, info, warn, Level};

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub bot: Bot,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            bot: Bot::new(&config.app)?,
            rate_limiter: RateLimiter::new(&config.app.rate_limit),
        })
    }
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let max_port_attempts = 10;
    let addr = find_available_port(config.host, config.port, max_port_attempts).await?;

    let state = Arc::new(AppState::new(&config)?);
    let pruner = spawn_pruner(Arc::clone(&state), config.prune_interval_secs);
    let app = create_app(Arc::clone(&state), &config);
    let local_ip = utils::get_local_ip();

    println!("\n=================================================================");
    println!("🎓 EduBot v{}", env!("CARGO_PKG_VERSION"));
    println!("🌐 Local URL:         http://localhost:{}", addr.port());
    if local_ip != "localhost" && !addr.ip().is_loopback() {
        println!("🔗 Network URL:       http://{}:{}", local_ip, addr.port());
    }
    println!("⚙️  Binding to address: {}", addr);
    if let Some(dir) = &config.static_dir {
        println!("📂 Static files:      {}", dir.display());
    }
    println!("🔒 CORS enabled:      {}", config.enable_cors);
    println!("🚦 Rate limiting:     {}", config.app.rate_limit.enabled);
    println!("=================================================================\n");

    info!("Starting EduBot server on {}", addr);
    println!("Server starting! Press Ctrl+C to stop.");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    pruner.abort();
    println!("\nServer shutdown complete.");
    Ok(())
}

/// Periodically drops idle conversations, expired contexts and stale rate-limit windows.
fn spawn_pruner(state: Arc<AppState>, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        // The first tick fires immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            prune_once(&state);
        }
    })
}

fn prune_once(state: &AppState) {
    let now = Utc::now();
    let conversations = state.bot.conversations.prune_idle(now);
    let contexts = state.bot.contexts.cleanup(now);
    state.rate_limiter.prune(now);
    if conversations > 0 || contexts > 0 {
        info!(
            "Pruned {} idle conversations and {} expired contexts",
            conversations, contexts
        );
    } else {
        debug!("Prune pass found nothing to remove");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn find_available_port(req_host: std::net::IpAddr, start_port: u16, max_attempts: u8) -> Result<SocketAddr> {
    let mut current_port = start_port;

    for attempt in 0..max_attempts {
        let addr = SocketAddr::new(req_host, current_port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                drop(listener);
                if attempt > 0 {
                    info!(
                        "Port {} was unavailable, successfully bound to available port {}.",
                        start_port, current_port
                    );
                }
                return Ok(addr);
            }
            Err(e) => {
                warn!(
                    "Attempt {}: Port {} on host {} is unavailable (Error: {}). Trying next port...",
                    attempt + 1,
                    current_port,
                    req_host,
                    e
                );
                current_port = current_port.checked_add(1).context("Ran out of port numbers")?;
            }
        }
    }

    anyhow::bail!(
        "Could not find an available port on host {} starting from port {} after trying {} ports.",
        req_host,
        start_port,
        max_attempts
    )
}

pub fn create_app(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors_layer = if config.enable_cors {
        info!("CORS middleware enabled (permissive).");
        CorsLayer::permissive()
    } else {
        info!("CORS middleware disabled.");
        CorsLayer::new()
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/chat/history", get(handlers::chat_history))
        .route("/feedback", post(handlers::feedback))
        .route("/feedback/request", get(handlers::feedback_request))
        .route("/conversation/start", post(handlers::conversation_start))
        .route("/conversation/{id}/summary", get(handlers::conversation_summary))
        .route("/autocomplete", get(handlers::autocomplete))
        .route("/autocomplete/history", delete(handlers::autocomplete_clear))
        .route("/autocomplete/trending", get(handlers::autocomplete_trending))
        .route("/autocomplete/category/{category}", get(handlers::autocomplete_category))
        .route("/context/save", post(handlers::context_save))
        .route(
            "/context/{id}",
            get(handlers::context_load).delete(handlers::context_clear),
        )
        .route("/knowledge", get(handlers::knowledge_section))
        .route("/knowledge/search", get(handlers::knowledge_search))
        .route("/analytics/dashboard", get(handlers::analytics_dashboard))
        .route("/analytics/users", get(handlers::analytics_users))
        .route("/admin/conversations", get(handlers::admin_conversations))
        .route("/admin/export", get(handlers::admin_export))
        .route("/admin/rate-limit/stats", get(handlers::rate_limit_stats))
        .route("/admin/rate-limit/violations", get(handlers::rate_limit_violations))
        .route("/admin/rate-limit/set-limit", post(handlers::rate_limit_set))
        .route("/admin/rate-limit/limit/{identifier}", delete(handlers::rate_limit_remove))
        .route("/admin/rate-limit/block", post(handlers::rate_limit_block))
        .route("/admin/rate-limit/unblock", post(handlers::rate_limit_unblock));

    let mut app = Router::new()
        .route("/", get(handlers::chat_page))
        .route("/chat", get(handlers::chat_page))
        .route("/about", get(handlers::about_page))
        .nest("/api", api);

    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.with_state(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer)
            .layer(cors_layer),
    )
}
