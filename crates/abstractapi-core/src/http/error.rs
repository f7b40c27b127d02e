//! Error classification for upstream outcomes
//!
//! Maps HTTP status codes and transport failures into the small, stable set of
//! caller-visible outcomes. The status code always decides the kind; a body
//! that accompanies an error status only contributes to the message.

use crate::http::transport::{TransportError, TransportErrorKind};
use crate::redaction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Longest upstream error text carried into a message
const MAX_UPSTREAM_DETAIL: usize = 300;

/// Classification of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// Missing or empty API key, detected before any network call
    #[serde(rename = "ConfigurationError")]
    Configuration,
    /// Connection refused, DNS failure, timeout
    #[serde(rename = "NetworkError")]
    Network,
    /// HTTP 401/403: the key was rejected upstream
    #[serde(rename = "AuthenticationError")]
    Authentication,
    /// HTTP 400/422: upstream rejected the supplied parameters
    #[serde(rename = "InvalidInputError")]
    InvalidInput,
    /// HTTP 429
    #[serde(rename = "RateLimitError")]
    RateLimit,
    /// HTTP 5xx and any other unexpected status
    #[serde(rename = "UpstreamServiceError")]
    UpstreamService,
    /// 2xx with a body that is not a JSON object
    #[serde(rename = "MalformedResponseError")]
    MalformedResponse,
    /// Caller supplied a missing or empty argument; never derived from HTTP
    #[serde(rename = "InvalidArgumentError")]
    InvalidArgument,
}

impl ErrorClassification {
    /// Caller-visible kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClassification::Configuration => "ConfigurationError",
            ErrorClassification::Network => "NetworkError",
            ErrorClassification::Authentication => "AuthenticationError",
            ErrorClassification::InvalidInput => "InvalidInputError",
            ErrorClassification::RateLimit => "RateLimitError",
            ErrorClassification::UpstreamService => "UpstreamServiceError",
            ErrorClassification::MalformedResponse => "MalformedResponseError",
            ErrorClassification::InvalidArgument => "InvalidArgumentError",
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorClassification::Authentication,
            400 | 422 => ErrorClassification::InvalidInput,
            429 => ErrorClassification::RateLimit,
            408 => ErrorClassification::Network,
            _ => ErrorClassification::UpstreamService,
        }
    }
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a failed operation, returned to the caller as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{classification}: {message}")]
pub struct ServiceError {
    /// Kind, so an automated caller can branch on it
    #[serde(rename = "kind")]
    pub classification: ErrorClassification,
    /// Human-readable description, already redacted
    pub message: String,
    /// HTTP status code if the failure came from a response
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ServiceError {
    pub fn new(classification: ErrorClassification, message: impl Into<String>) -> Self {
        Self {
            classification,
            message: message.into(),
            status_code: None,
        }
    }

    /// The API key is absent or empty
    pub fn missing_api_key() -> Self {
        Self::new(ErrorClassification::Configuration, "API key not configured")
    }

    /// A caller argument is missing, empty, or has the wrong type
    pub fn invalid_argument(field: &str, problem: impl fmt::Display) -> Self {
        Self::new(
            ErrorClassification::InvalidArgument,
            format!("argument '{}' {}", field, problem),
        )
    }

    /// The upstream answered 2xx with something that is not a JSON object
    pub fn malformed(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorClassification::MalformedResponse,
            format!("upstream returned an unexpected response body: {}", detail),
        )
    }

    /// Classify a non-2xx response.
    ///
    /// `secret` is scrubbed from any upstream text that ends up in the message.
    pub fn from_status(status: u16, body: &[u8], secret: Option<&str>) -> Self {
        let classification = ErrorClassification::from_status(status);
        let summary = match classification {
            ErrorClassification::Authentication => "API key rejected by upstream service",
            ErrorClassification::InvalidInput => "upstream rejected the supplied parameters",
            ErrorClassification::RateLimit => {
                "rate limit exceeded, slow down before calling again"
            }
            ErrorClassification::Network => "upstream timed out while handling the request",
            _ => "upstream service failed",
        };

        let mut message = format!("{} (HTTP {})", summary, status);
        if let Some(detail) = extract_upstream_detail(body) {
            message.push_str(": ");
            let detail = redaction::redact(&detail, secret);
            message.push_str(&truncate(&detail, MAX_UPSTREAM_DETAIL));
        }

        Self {
            classification,
            message,
            status_code: Some(status),
        }
    }

    /// Classify a transport-level failure
    pub fn from_transport(error: &TransportError, secret: Option<&str>) -> Self {
        let cause = match error.kind {
            TransportErrorKind::Timeout => "request timed out",
            TransportErrorKind::Connect => "could not connect to upstream service",
            TransportErrorKind::Other => "request to upstream service failed",
        };
        Self::new(
            ErrorClassification::Network,
            format!("{}: {}", cause, redaction::redact(&error.message, secret)),
        )
    }
}

/// Pull a short human-readable message out of an upstream error body.
///
/// Understands `{"error": {"message": ..., "details": ...}}`, `{"error": "..."}`
/// and `{"message": "..."}`; falls back to short plain-text bodies.
fn extract_upstream_detail(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let detail = match serde_json::from_slice::<Value>(body) {
        Ok(json) => match json.get("error") {
            Some(Value::Object(error)) => error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| error.get("code").and_then(Value::as_str).map(str::to_string)),
            Some(Value::String(message)) => Some(message.clone()),
            _ => json
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            // HTML error pages carry no useful detail
            if text.is_empty() || text.starts_with('<') {
                None
            } else {
                Some(text)
            }
        }
    }?;

    let detail = detail.trim();
    if detail.is_empty() {
        return None;
    }
    Some(detail.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
