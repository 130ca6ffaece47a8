//! Error types for Chatline
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatline operations
///
/// Covers input validation, remote service failures, streaming exchange
/// outcomes, and configuration problems. Functions return
/// [`Result`], which wraps these in `anyhow::Error`; use
/// [`ChatlineError::classify`] to recover the typed variant.
#[derive(Error, Debug)]
pub enum ChatlineError {
    /// Input rejected before any network call (e.g. empty message)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conversation or shared link does not exist (or has expired)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller lacks permission to view the requested content
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The service rejected the credentials (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Network or service failure with no more specific cause
    #[error("Service unavailable: {0}")]
    Transient(String),

    /// The remote service reported an error inside a streaming exchange
    #[error("Stream error: {0}")]
    Stream(String),

    /// A send was attempted while another exchange is still in flight
    #[error("A response is still streaming; wait for it to finish")]
    Busy,

    /// The exchange was abandoned before it reached a terminal event
    #[error("Streaming exchange was cancelled")]
    Cancelled,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ChatlineError {
    /// Recover the typed error from an `anyhow::Error`, if there is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::error::ChatlineError;
    ///
    /// let err: anyhow::Error = ChatlineError::Busy.into();
    /// assert!(matches!(ChatlineError::classify(&err), Some(ChatlineError::Busy)));
    /// ```
    pub fn classify(err: &anyhow::Error) -> Option<&ChatlineError> {
        err.downcast_ref::<ChatlineError>()
    }

    /// Whether the failure is worth retrying later by the user.
    ///
    /// Transport-level HTTP failures and [`ChatlineError::Transient`] count;
    /// missing or forbidden content does not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChatlineError::Transient(_) | ChatlineError::Http(_) | ChatlineError::Stream(_)
        )
    }
}

/// Result type alias for Chatline operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
