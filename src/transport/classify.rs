//! Mapping from HTTP responses to failure kinds.

use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::HttpError;
use crate::error::Error;

/// Seconds to wait when a 429 response carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Longest slice of a non-envelope body kept in a fallback message.
const BODY_SNIPPET_CHARS: usize = 200;

/// A business-level error reported by the API.
///
/// Built from the vendor envelope
/// `{"error": {"message", "code", "error_subcode", "error_data"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error ({status}): {message}")]
pub struct ApiError {
    /// HTTP status of the response
    pub status: u16,
    /// Vendor message, or a fallback when the body had none
    pub message: String,
    /// Vendor error code (`error.code`)
    pub code: Option<i64>,
    /// Vendor error subcode (`error.error_subcode`)
    pub subcode: Option<i64>,
    /// Additional vendor detail (`error.error_data`)
    pub details: Option<Value>,
}

/// Classified non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// HTTP 429.
    RateLimited {
        /// Parsed `Retry-After`, or [`DEFAULT_RETRY_AFTER_SECS`]
        retry_after_secs: u64,
    },
    /// HTTP 401 or 403.
    Authentication {
        /// HTTP status code
        status: u16,
        /// Vendor message or "Authentication failed"
        message: String,
    },
    /// Any other non-success status below 500.
    Api(ApiError),
    /// HTTP 5xx.
    Server {
        /// HTTP status code
        status: u16,
        /// Vendor message or the status reason phrase
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    error: EnvelopeError,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeError {
    message: Option<String>,
    code: Option<i64>,
    error_subcode: Option<i64>,
    error_data: Option<Value>,
}

fn parse_envelope(body: &[u8]) -> Option<EnvelopeError> {
    serde_json::from_slice::<Envelope>(body)
        .ok()
        .map(|envelope| envelope.error)
}

/// Classifies a response. Returns `None` for 2xx statuses.
///
/// Pure and total: the same inputs always yield an equal result, and a
/// malformed body still produces a best-effort classification.
#[must_use]
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Option<Failure> {
    if status.is_success() {
        return None;
    }

    let failure = match status {
        StatusCode::TOO_MANY_REQUESTS => Failure::RateLimited {
            retry_after_secs: retry_after(headers),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Failure::Authentication {
            status: status.as_u16(),
            message: parse_envelope(body)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Authentication failed".to_string()),
        },
        s if s.is_server_error() => Failure::Server {
            status: s.as_u16(),
            message: parse_envelope(body)
                .and_then(|e| e.message)
                .unwrap_or_else(|| status_text(s)),
        },
        _ => Failure::Api(api_error_from_body(status.as_u16(), body)),
    };

    Some(failure)
}

/// Builds an [`ApiError`] from a response body.
///
/// An envelope without a message yields "Unknown API error"; a body that
/// is not an envelope at all yields `HTTP <status>` followed by a snippet
/// of the body text.
#[must_use]
pub fn api_error_from_body(status: u16, body: &[u8]) -> ApiError {
    match parse_envelope(body) {
        Some(error) => ApiError {
            status,
            message: error
                .message
                .unwrap_or_else(|| "Unknown API error".to_string()),
            code: error.code,
            subcode: error.error_subcode,
            details: error.error_data,
        },
        None => ApiError {
            status,
            message: fallback_message(status, body),
            code: None,
            subcode: None,
            details: None,
        },
    }
}

fn fallback_message(status: u16, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return format!("HTTP {status}");
    }

    let snippet: String = text.chars().take(BODY_SNIPPET_CHARS).collect();
    format!("HTTP {status}: {snippet}")
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().map_or_else(
        || format!("HTTP {}", status.as_u16()),
        |reason| format!("HTTP {}: {reason}", status.as_u16()),
    )
}

fn retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(http::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Extension trait for checking if a failure is worth another attempt.
///
/// Only transient failures qualify: network-level errors and server
/// errors. Rate limiting, authentication, and client errors are final.
pub trait IsRetryable {
    /// Returns true if the failure is potentially transient.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidUrl(_) | Self::InvalidRequest(_) => false,
        }
    }
}

impl IsRetryable for Failure {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited { retry_after_secs } => {
                write!(f, "rate limited, retry after {retry_after_secs}s")
            }
            Self::Authentication { status, message } => {
                write!(f, "authentication failed ({status}): {message}")
            }
            Self::Api(error) => std::fmt::Display::fmt(error, f),
            Self::Server { status, message } => write!(f, "server error ({status}): {message}"),
        }
    }
}

impl From<Failure> for Error {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            Failure::Authentication { status, message } => Self::Authentication { status, message },
            Failure::Api(error) => Self::Api(error),
            server @ Failure::Server { .. } => Self::Network {
                message: server.to_string(),
                source: None,
            },
        }
    }
}
