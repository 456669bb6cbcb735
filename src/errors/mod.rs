//! Error handling module for the Buddy System frontend.
//!
//! Every failure a page can see is folded into [`ApiError`], which carries a
//! human-readable message suitable for a toast or an inline status block.

use serde_json::Value;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Message shown after a 401, just before the redirect happens.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Failure of a call made through the API client.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response
    Network(String),
    /// The backend rejected the session; the token is already cleared
    Unauthorized,
    /// Structured field-level validation failure
    Validation(String),
    /// Any other non-success status
    Http { status: u16, message: String },
    /// The response body did not match the expected shape
    Decode(String),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network(_) => codes::NETWORK_ERROR,
            ApiError::Unauthorized => codes::UNAUTHORIZED,
            ApiError::Validation(_) => codes::VALIDATION_ERROR,
            ApiError::Http { .. } => codes::HTTP_ERROR,
            ApiError::Decode(_) => codes::DECODE_ERROR,
        }
    }

    /// Get the message to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(msg) => msg.clone(),
            ApiError::Unauthorized => SESSION_EXPIRED.to_string(),
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Decode(msg) => msg.clone(),
        }
    }

    /// HTTP status associated with the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build the error for a non-success response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }

        let parsed: Option<Value> = serde_json::from_str(body).ok();
        if let Some(Value::Array(entries)) = parsed.as_ref().and_then(|v| v.get("detail")) {
            let message = validation_message(entries);
            if !message.is_empty() {
                return ApiError::Validation(message);
            }
        }

        ApiError::Http {
            status,
            message: error_message(status, body),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Transport error: {:?}", err);
        if err.is_decode() {
            ApiError::Decode(format!("Unexpected response from server: {}", err))
        } else {
            ApiError::Network(format!("Network error: {}", err))
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ApiError::Decode(format!("Unexpected response from server: {}", err))
    }
}

/// Build a single human-readable message from an error response body.
///
/// Understands `{"detail": "..."}`, `{"detail": [{"loc": [...], "msg": "..."}]}`
/// and `{"message": "..."}`, then falls back to the raw text and finally to the
/// bare status.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => return detail.clone(),
            Some(Value::Array(entries)) => {
                let message = validation_message(entries);
                if !message.is_empty() {
                    return message;
                }
            }
            _ => {}
        }
        if let Some(Value::String(message)) = value.get("message") {
            if !message.trim().is_empty() {
                return message.clone();
            }
        }
    }

    let text = body.trim();
    if text.is_empty() {
        format!("HTTP error {}", status)
    } else {
        text.to_string()
    }
}

fn validation_message(entries: &[Value]) -> String {
    entries
        .iter()
        .filter_map(|entry| {
            let msg = entry.get("msg").and_then(Value::as_str)?;
            let field = entry
                .get("loc")
                .and_then(Value::as_array)
                .and_then(|loc| loc.last())
                .map(|last| match last {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            Some(match field {
                Some(field) => format!("{}: {}", field, msg),
                None => msg.to_string(),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl ConfigError {
    pub fn invalid(variable: &'static str, value: &str) -> Self {
        Self {
            variable,
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: invalid value {:?} for {}",
            codes::CONFIG_ERROR,
            self.value,
            self.variable
        )
    }
}

impl std::error::Error for ConfigError {}
