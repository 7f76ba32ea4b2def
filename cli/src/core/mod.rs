//! # EduBot Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by the bot engine and every command:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and the crate-wide `Result` alias
//! - `templating`: The compiled registry of HTML templates
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{EdubotError, Result}; // For error handling
//! use crate::core::templating::TemplateRegistry; // For HTML rendering
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;
