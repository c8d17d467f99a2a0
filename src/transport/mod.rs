//! Outbound HTTP layer for the Graph API.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`]) and reading responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`]), with a reqwest implementation ([`ReqwestClient`])
//! - Throttling outbound calls ([`RateLimiter`])
//! - Mapping non-success responses to failure kinds ([`classify`])
//! - Executing authenticated calls with retries ([`Transport`], [`RetryPolicy`])

mod classify;
mod client;
mod error;
mod executor;
mod http;
mod rate_limit;
mod retry;
mod settings;

#[cfg(test)]
mod client_tests;
#[cfg(test)]
mod retry_tests;

pub use classify::{
    ApiError, DEFAULT_RETRY_AFTER_SECS, Failure, IsRetryable, api_error_from_body, classify,
};
pub use client::ReqwestClient;
pub use error::HttpError;
pub use executor::{RequestBody, RequestSpec, Transport};
pub use self::http::{FilePart, HttpBody, HttpClient, HttpRequest, HttpResponse, MultipartForm};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use settings::TransportSettings;
