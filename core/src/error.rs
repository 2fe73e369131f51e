//! Error types for the taskboard API client.
//!
//! # Design
//! HTTP-status failures keep the server's best-effort message and the status
//! code. An unreachable server and an expired deadline get two fixed,
//! user-facing messages so the UI can show them verbatim; a connection that
//! breaks mid-exchange keeps the transport's own description. Everything is
//! surfaced through `ApiError` and nothing is retried.

use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error: unable to reach the server.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out: the server did not respond.";
pub const CANCELLED_MESSAGE: &str = "Request was cancelled.";

/// Errors surfaced by `ApiClient` and the resource stores.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { message: String, status: u16 },

    /// Connection refused, DNS failure and similar.
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network,

    /// The connection broke after it was made, e.g. reset while reading the body.
    #[error("Network error: {0}")]
    Transport(String),

    /// The internal deadline expired before the server answered.
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,

    /// A caller-supplied token fired.
    #[error("{}", CANCELLED_MESSAGE)]
    Cancelled,

    /// A 2xx body had an unexpected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A 2xx body could not be deserialized.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            message: message.into(),
            status,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Deserialization(err.to_string())
    }
}

/// Collapse any client error into a display string.
///
/// Prefers the server-provided message of an HTTP error, then the error's own
/// text, then `default` when whichever was chosen is blank.
pub fn error_message(err: &ApiError, default: &str) -> String {
    let message = match err {
        ApiError::Http { message, .. } => message.clone(),
        other => other.to_string(),
    };
    if message.trim().is_empty() {
        default.to_string()
    } else {
        message
    }
}
