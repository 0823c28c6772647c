//! Shared error taxonomy for the document pipeline.

use thiserror::Error;

/// Application-level error types.
///
/// API-side errors surface as HTTP status codes; consumer-side errors are
/// caught at the per-message boundary and never terminate the worker.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad input shape or size. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing entity. Maps to 404 on the API side, discard on consume.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Message channel unreachable or refused the operation.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Undecodable payload or missing required fields. Discarded, counted.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMessage(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is safe to surface verbatim to API clients.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage(err.to_string())
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
