//! # EduBot Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Each top-level command lives in its own module with an `Args` struct and
//! a `handle_*` function that `main.rs` dispatches to.
//!
//! - `serve`: HTTP API and chat pages
//! - `chat`: interactive terminal chat
//! - `kb`: knowledge base lookup
//! - `loadtest`: concurrent user simulation against a running server
//!

/// Terminal chat with the bot.
pub mod chat;
/// Knowledge base `show` and `search`.
pub mod kb;
/// Load testing with simulated users.
pub mod loadtest;
/// The HTTP server.
pub mod serve;
