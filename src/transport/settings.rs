//! Connection and behavior settings for the transport.

use std::time::Duration;

use url::Url;

use crate::config::defaults;
use crate::error::{Error, Result};

/// Settings that shape how requests are sent.
///
/// [`ValidatedConfig`](crate::config::ValidatedConfig) produces settings
/// within range. Hand-built settings are checked by [`validate`](Self::validate)
/// when a transport is created.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSettings {
    /// Versioned API root, e.g. `https://graph.facebook.com`
    pub base_url: Url,
    /// API version path segment, e.g. `v23.0`
    pub api_version: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Total attempts per logical request
    pub max_retries: u32,
    /// Whether TLS certificates are verified
    pub verify_tls: bool,
    /// Idle connections kept per host
    pub pool_size: usize,
    /// Outbound calls allowed per rolling second
    pub rate_limit: u32,
}

impl TransportSettings {
    /// Maximum concurrent connections, twice the pool size.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.pool_size.saturating_mul(2)
    }

    /// Checks the values a transport cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `rate_limit` is outside 1 to 1000
    /// calls per second, or `timeout` is zero or longer than 300 seconds.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit == 0 || self.rate_limit > defaults::MAX_RATE_LIMIT {
            return Err(Error::validation(
                "rate_limit",
                format!("must be 1 to {} calls per second", defaults::MAX_RATE_LIMIT),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::validation("timeout", "must be greater than 0"));
        }
        if self.timeout > Duration::from_secs(defaults::MAX_TIMEOUT_SECS) {
            return Err(Error::validation(
                "timeout",
                format!("must be at most {} seconds", defaults::MAX_TIMEOUT_SECS),
            ));
        }
        Ok(())
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            api_version: defaults::API_VERSION.to_string(),
            timeout: defaults::timeout(),
            max_retries: defaults::MAX_RETRIES,
            verify_tls: defaults::VERIFY_TLS,
            pool_size: defaults::POOL_SIZE,
            rate_limit: defaults::RATE_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vendor_recommendations() {
        let settings = TransportSettings::default();

        assert_eq!(settings.base_url.as_str(), "https://graph.facebook.com/");
        assert_eq!(settings.api_version, "v23.0");
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.max_retries, 3);
        assert!(settings.verify_tls);
        assert_eq!(settings.pool_size, 100);
        assert_eq!(settings.rate_limit, 80);
    }

    #[test]
    fn max_connections_is_twice_pool_size() {
        let settings = TransportSettings {
            pool_size: 7,
            ..TransportSettings::default()
        };

        assert_eq!(settings.max_connections(), 14);
    }

    fn rejected_field(settings: &TransportSettings) -> &'static str {
        match settings.validate() {
            Err(Error::Validation { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(TransportSettings::default().validate().is_ok());
    }

    #[test]
    fn rate_limit_must_be_between_one_and_a_thousand() {
        for rate_limit in [0, 1001] {
            let settings = TransportSettings {
                rate_limit,
                ..TransportSettings::default()
            };
            assert_eq!(rejected_field(&settings), "rate_limit");
        }

        let busiest = TransportSettings {
            rate_limit: 1000,
            ..TransportSettings::default()
        };
        assert!(busiest.validate().is_ok());
    }

    #[test]
    fn timeout_must_be_positive_and_at_most_five_minutes() {
        for timeout in [Duration::ZERO, Duration::from_secs(301)] {
            let settings = TransportSettings {
                timeout,
                ..TransportSettings::default()
            };
            assert_eq!(rejected_field(&settings), "timeout");
        }

        let longest = TransportSettings {
            timeout: Duration::from_secs(300),
            ..TransportSettings::default()
        };
        assert!(longest.validate().is_ok());
    }
}
