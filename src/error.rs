//! Error taxonomy shared by every client operation.

use std::fmt;

use thiserror::Error;

use crate::transport::{ApiError, HttpError};

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by client, transport, media, and webhook operations.
///
/// Each variant carries the structured detail needed for programmatic
/// handling (vendor code, HTTP status, field name) in addition to its
/// human-readable message. Use [`Error::kind`] for a stable tag.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected locally before any network call.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending input field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The API rejected the credentials (HTTP 401 or 403).
    #[error("Authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code
        status: u16,
        /// Vendor-supplied message
        message: String,
    },

    /// The API is throttling this client (HTTP 429).
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying, from `Retry-After`
        retry_after_secs: u64,
    },

    /// A business-level error reported by the API.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Transport failure after retries were exhausted.
    #[error("Network error: {message}")]
    Network {
        /// Description including the attempt count and last cause
        message: String,
        /// Last transport-level cause, when there was one
        #[source]
        source: Option<HttpError>,
    },

    /// Local media problem detected before upload (missing file, size limit).
    #[error("Media error: {message}")]
    Media {
        /// Description of the problem
        message: String,
        /// Media id involved, if any
        media_id: Option<String>,
    },

    /// Webhook signature or configuration failure.
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// The operation was aborted through its cancellation token.
    #[error("Operation cancelled")]
    Cancelled,

    /// A successful response could not be shaped into the expected type.
    #[error("Failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded
        context: &'static str,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Stable, payload-free tag for an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::Authentication`]
    Authentication,
    /// See [`Error::RateLimited`]
    RateLimited,
    /// See [`Error::Api`]
    Api,
    /// See [`Error::Network`]
    Network,
    /// See [`Error::Media`]
    Media,
    /// See [`Error::Webhook`]
    Webhook,
    /// See [`Error::Cancelled`]
    Cancelled,
    /// See [`Error::Decode`]
    Decode,
}

impl ErrorKind {
    /// Returns the tag as a `snake_case` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::RateLimited => "rate_limited",
            Self::Api => "api",
            Self::Network => "network",
            Self::Media => "media",
            Self::Webhook => "webhook",
            Self::Cancelled => "cancelled",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Returns the stable kind tag of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Api(_) => ErrorKind::Api,
            Self::Network { .. } => ErrorKind::Network,
            Self::Media { .. } => ErrorKind::Media,
            Self::Webhook(_) => ErrorKind::Webhook,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Creates a `Validation` error.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a `Media` error not tied to a specific media id.
    pub fn media(message: impl Into<String>) -> Self {
        Self::Media {
            message: message.into(),
            media_id: None,
        }
    }
}
