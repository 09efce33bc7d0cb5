// Client-side error types for calls against the SafeTNet backend
use serde_json::Value;
use thiserror::Error;

/// Text shown when a request never reached the backend
pub const NETWORK_FAILURE_TEXT: &str = "Network error: unable to reach the server";

/// Errors raised by resource clients and the authentication service
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never completed (DNS, connect, TLS, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success status; `detail` is the surfaced body or the generic fallback
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    /// `get(id)` against a resource that did not answer with success
    #[error("not found: {path} (HTTP {status}): {detail}")]
    NotFound {
        path: String,
        status: u16,
        detail: String,
    },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Record id that cannot stand as a single path segment
    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    /// Operation needs a stored credential that is not there
    #[error("not authenticated: {0}")]
    Unauthenticated(String),
}

impl ClientError {
    /// Build a status error from a raw response body
    pub fn from_status(status: u16, body: &str) -> Self {
        ClientError::Status {
            status,
            detail: error_detail(status, body),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::NotFound { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text surfaced to the user in a notification
    pub fn notification_text(&self) -> String {
        match self {
            ClientError::Network(_) => NETWORK_FAILURE_TEXT.to_string(),
            ClientError::Status { detail, .. } => detail.clone(),
            ClientError::NotFound { detail, .. } => detail.clone(),
            ClientError::Decode(msg) => format!("Unexpected response from server: {}", msg),
            ClientError::InvalidUrl(e) => format!("Invalid server address: {}", e),
            ClientError::InvalidId(id) => format!("Invalid record id: {}", id),
            ClientError::Unauthenticated(msg) => msg.clone(),
        }
    }
}

/// Extract the user-facing detail from an error body.
///
/// A JSON object with a string `detail` yields that string. Any other JSON
/// body is surfaced verbatim (stringified). Bodies that are not JSON fall back
/// to a generic message naming the status.
pub fn error_detail(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            _ => Value::Object(map).to_string(),
        },
        Ok(Value::Null) | Err(_) => fallback_detail(status),
        Ok(other) => other.to_string(),
    }
}

pub fn fallback_detail(status: u16) -> String {
    format!("Request failed with status {}", status)
}

/// Errors from a key/value storage backend. Never escapes the credential store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}
