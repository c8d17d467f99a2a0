//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

use url::Url;

/// Default Graph API version.
pub const API_VERSION: &str = "v23.0";

/// Default Graph API root.
pub const BASE_URL: &str = "https://graph.facebook.com";

/// Default request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Longest accepted request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Default number of attempts per request.
pub const MAX_RETRIES: u32 = 3;

/// Largest accepted `max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// TLS certificates are verified unless disabled.
pub const VERIFY_TLS: bool = true;

/// Default idle connections kept per host.
pub const POOL_SIZE: usize = 100;

/// Default outbound calls per rolling second.
pub const RATE_LIMIT: u32 = 80;

/// Largest accepted rate limit.
pub const MAX_RATE_LIMIT: u32 = 1000;

/// Debug logging is off unless enabled.
pub const DEBUG: bool = false;

/// Default output path of `wa-cloud init`.
pub const CONFIG_FILE: &str = "wa-cloud.toml";

/// Default request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default API root as a parsed URL.
#[must_use]
#[allow(clippy::missing_panics_doc)] // constant input
pub fn base_url() -> Url {
    Url::parse(BASE_URL).expect("BASE_URL is a valid absolute URL")
}
