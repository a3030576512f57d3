//! Error types shared by the todo model and the API client.
//!
//! # Design
//! `ValidationError` belongs to the model: the server rejects bad input with
//! it and the client refuses to build a request that would be rejected.
//!
//! On the client side, `NotFound` and `Validation` get dedicated variants
//! because callers act on them (drop a stale row, re-prompt the user). Any
//! other unexpected status lands in `Http` with the raw status and body.

use thiserror::Error;

/// Invalid todo input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task is required")]
    MissingTask,

    #[error("invalid priority {0:?}, expected one of High, Medium, Low")]
    InvalidPriority(String),

    #[error("invalid status {0:?}, expected one of Pending, In-Progress, Completed")]
    InvalidStatus(String),
}

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The input was rejected, locally or by the server with a 400.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The server returned an unexpected status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl ApiError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if *status >= 500)
    }
}
