//! Failures of a single request/response exchange.

use thiserror::Error;

/// Why one exchange with the Graph API produced no HTTP response.
///
/// A response with a non-2xx status is not an `HttpError`; those are
/// interpreted by [`classify`](super::classify). Whether an `HttpError`
/// earns another attempt is decided by [`IsRetryable`](super::IsRetryable).
#[derive(Debug, Error)]
pub enum HttpError {
    /// DNS, TCP or TLS failure, or the connection dropped mid-exchange.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No response within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request URL was rejected by the HTTP client.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be assembled, e.g. a multipart part with a
    /// malformed MIME type.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    /// Wraps any error as a connection failure.
    pub fn connection(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Connection(Box::new(error))
    }
}
