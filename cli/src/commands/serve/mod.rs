//! # EduBot Serve Command
//!
//! File: cli/src/commands/serve/mod.rs
//!
//! ## Overview
//!
//! `edubot serve` runs the chatbot as an HTTP service: the chat and about
//! pages, the JSON API under `/api`, and optionally a static directory under
//! `/static`.
//!
//! - `config`: merges flags over the layered configuration
//! - `handlers`: route handlers and the JSON envelope
//! - `server_logic`: router, listener, background pruning, shutdown
//! - `utils`: banner helpers
//!
use crate::core::config::Config;
use crate::core::error::Result;
use tracing::info;

pub use config::ServeArgs;

pub mod config;
pub mod handlers;
pub mod server_logic;
pub mod utils;

pub async fn handle_serve(args: ServeArgs, config: Config) -> Result<()> {
    info!("Handling serve command with args: {:?}", args);
    let config = config::load_and_merge_config(args, config).await?;
    info!("Effective server config: {:?}", config);
    server_logic::run_server(config).await
}
