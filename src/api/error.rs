//! Error taxonomy for backend calls.

use thiserror::Error;

/// Errors returned by the REST collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or HTTP layer failure (connect, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Structured rejection from the server (400, 409, 422).
    #[error("Validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    /// The requested record does not exist.
    #[error("Not found")]
    NotFound { message: Option<String> },

    /// Any other non-success response.
    #[error("Server error {status}")]
    Server { status: u16, message: Option<String> },

    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown error")]
    Unknown(Option<String>),
}

impl ApiError {
    /// Map a non-success status and its optional server message to an error.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            404 => ApiError::NotFound { message },
            400 | 409 | 422 => ApiError::Validation {
                status,
                message: message.unwrap_or_else(|| format!("request rejected with status {status}")),
            },
            _ => ApiError::Server { status, message },
        }
    }

    /// Message provided by the server body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Validation { message, .. } => Some(message),
            ApiError::NotFound { message } | ApiError::Server { message, .. } => {
                message.as_deref()
            }
            ApiError::Unknown(message) => message.as_deref(),
            _ => None,
        }
    }

    /// Generic transport-level description, when the failure has one.
    pub fn transport_message(&self) -> Option<String> {
        match self {
            ApiError::Unknown(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Text to show a user: the server's own message, else the transport
    /// description. `None` leaves the choice of default to the caller.
    pub fn user_message(&self) -> Option<String> {
        self.server_message()
            .map(str::to_string)
            .or_else(|| self.transport_message())
    }

    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "transport",
            ApiError::Validation { .. } => "validation",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Server { .. } => "server",
            ApiError::Decode(_) => "decode",
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::Unknown(_) => "unknown",
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"message": ".."}`, `{"error": ".."}` and
/// `{"error": {"message": ".."}}`; plain-text bodies are used as-is.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    let message = value
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| value.get("error").and_then(|e| e.as_str()))
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
        })?;
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}
