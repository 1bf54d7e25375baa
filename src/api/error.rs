use serde_json::Value;
use thiserror::Error;

/// Longest server body echoed back to the operator.
const MAX_MESSAGE_CHARS: usize = 200;

/// Failures of a backend call, all surfaced as an action's `error` phase.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never reached the server or the response never arrived.
    #[error("Network error: {0}")]
    Transport(String),
    /// Non-success status; `message` is whatever the body explained.
    #[error("{}", status_text(.status, .message))]
    Status { status: u16, message: Option<String> },
    /// The body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
    /// The AOI file could not be read or parsed; nothing was sent.
    #[error("{0}")]
    LocalFile(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport("request timed out".to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl ApiError {
    /// Build a status error from the response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            message: server_message(body),
        }
    }
}

fn status_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(msg) => msg.clone(),
        None => format!("HTTP {}", status),
    }
}

/// Best-effort human-readable message from an error body.
///
/// JSON bodies are searched for `detail`, `message` or `error` (FastAPI's
/// validation list of `{msg}` objects included); anything else is returned as
/// trimmed text.
pub fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed)
        && let Some(message) = json_message(&value)
    {
        return Some(message);
    }
    Some(truncate(trimmed))
}

fn json_message(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty(text),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(json_message).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        Value::Object(obj) => ["detail", "message", "error", "msg"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(json_message)),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate(trimmed))
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_MESSAGE_CHARS {
        let head: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
