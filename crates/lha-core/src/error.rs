//! Centralized error types for the calculator.

use thiserror::Error;

/// Main error type for calculator operations.
///
/// Every variant's `Display` text is what the visitor sees inside the
/// response envelope, so the messages are written for end users.
#[derive(Error, Debug)]
pub enum LhaError {
    #[error("Unknown action.")]
    UnknownAction(String),

    #[error("Invalid or expired security token.")]
    Auth,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Network(String),

    #[error("API request failed with HTTP {status} - {excerpt}")]
    Api { status: u16, excerpt: String },

    #[error("Invalid JSON from API.")]
    Parse(#[source] serde_json::Error),

    #[error("Settings store unavailable.")]
    Store(#[from] lha_redis::RedisError),

    #[error("Mail delivery failed: {0}")]
    Mail(String),
}

/// Result type for calculator operations.
pub type LhaResult<T> = Result<T, LhaError>;

impl LhaError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-readable name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) => "unknown_action",
            Self::Auth => "auth",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Api { .. } => "api",
            Self::Parse(_) => "parse",
            Self::Store(_) => "store",
            Self::Mail(_) => "mail",
        }
    }
}
