//! # EduBot Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout EduBot. Domain failures
//! are expressed as variants of `EdubotError`; everything is propagated as
//! `anyhow::Error` so call sites can attach context with `.context(...)`.
//!
//! The error types cover:
//! - Configuration errors
//! - Template rendering errors
//! - Conversation and input validation errors
//! - HTTP client errors raised by the load tester
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !(1..=5).contains(&rating) {
//!     return Err(EdubotError::Validation(format!("Rating {} is out of range", rating)))?;
//! }
//!
//! // Pattern matching on error types
//! match result {
//!     Err(e) if e.downcast_ref::<EdubotError>().is_some_and(|de| matches!(de, EdubotError::SessionNotFound { .. })) => {
//!         println!("No conversation yet");
//!     }
//!     other => other?,
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the EduBot application.
#[derive(Error, Debug)]
pub enum EdubotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No conversation found for session '{session_id}'.")]
    SessionNotFound { session_id: String },

    #[error("Unknown knowledge base section '{name}'.")]
    UnknownSection { name: String },

    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Load test failed: {0}")]
    LoadTest(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = EdubotError::Config("Missing setting 'port'".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: Missing setting 'port'"
        );

        let not_found = EdubotError::SessionNotFound {
            session_id: "guest-1234".into(),
        };
        assert_eq!(
            not_found.to_string(),
            "No conversation found for session 'guest-1234'."
        );

        let section = EdubotError::UnknownSection {
            name: "cafeteria".into(),
        };
        assert_eq!(
            section.to_string(),
            "Unknown knowledge base section 'cafeteria'."
        );
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let err: anyhow::Error = EdubotError::Validation("rating".into()).into();
        assert!(err
            .downcast_ref::<EdubotError>()
            .is_some_and(|e| matches!(e, EdubotError::Validation(_))));
    }
}
