//! Error types for the Inkly assistant
//!
//! Provides:
//! - Distinct error types for different failure modes
//! - Stable machine-readable error codes for embedding layers
//! - A policy split between caller-fatal errors and degradable failures

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AssistantError
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    InvalidInput,

    // Retrieval errors (2xxx)
    RetrievalTimeout,

    // Synthesis errors (3xxx)
    InsufficientContext,

    // Context store errors (4xxx)
    StoreError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput => 1001,
            ErrorCode::RetrievalTimeout => 2001,
            ErrorCode::InsufficientContext => 3001,
            ErrorCode::StoreError => 4001,
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Assistant error types
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Question text failed validation; surfaced immediately, nothing is
    /// recorded in the conversation ledger.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Strict synthesis mode only: no snippet cleared the relevance
    /// threshold, so no answer is produced and nothing is recorded.
    #[error("Insufficient context to answer: {query}")]
    InsufficientContext { query: String },

    /// Retrieval exceeded its time budget. Internal: the engine converts
    /// this to "empty context" and continues with a low-confidence answer.
    #[error("Retrieval timed out after {timeout_ms}ms")]
    RetrievalTimeout { timeout_ms: u64 },

    /// The context store failed to answer a search. Degrades like a timeout.
    #[error("Context store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AssistantError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AssistantError::InvalidInput { .. } => ErrorCode::InvalidInput,
            AssistantError::InsufficientContext { .. } => ErrorCode::InsufficientContext,
            AssistantError::RetrievalTimeout { .. } => ErrorCode::RetrievalTimeout,
            AssistantError::Store { .. } => ErrorCode::StoreError,
            AssistantError::Configuration { .. } => ErrorCode::ConfigurationError,
            AssistantError::Serialization(_) => ErrorCode::SerializationError,
            AssistantError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// True for errors caused by the caller's input rather than the engine
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AssistantError::InvalidInput { .. } | AssistantError::InsufficientContext { .. }
        )
    }

    /// True for failures the engine absorbs by degrading the answer instead
    /// of failing the call
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            AssistantError::RetrievalTimeout { .. } | AssistantError::Store { .. }
        )
    }
}

impl From<std::io::Error> for AssistantError {
    fn from(err: std::io::Error) -> Self {
        AssistantError::Store {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AssistantError {
    fn from(err: config::ConfigError) -> Self {
        AssistantError::Configuration {
            message: err.to_string(),
        }
    }
}
