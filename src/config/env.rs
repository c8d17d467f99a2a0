//! `WHATSAPP_*` environment variables.
//!
//! Values are captured once into an [`EnvConfig`] snapshot and parsed during
//! validation, so malformed values are reported with their variable name.

use std::collections::HashMap;

/// Business phone number id.
pub const PHONE_NUMBER_ID: &str = "WHATSAPP_PHONE_NUMBER_ID";
/// Access token.
pub const ACCESS_TOKEN: &str = "WHATSAPP_ACCESS_TOKEN";
/// App secret for webhook signatures.
pub const APP_SECRET: &str = "WHATSAPP_APP_SECRET";
/// Webhook verify token.
pub const WEBHOOK_VERIFY_TOKEN: &str = "WHATSAPP_WEBHOOK_VERIFY_TOKEN";
/// WhatsApp Business Account id.
pub const BUSINESS_ACCOUNT_ID: &str = "WHATSAPP_BUSINESS_ACCOUNT_ID";
/// API version.
pub const API_VERSION: &str = "WHATSAPP_API_VERSION";
/// API root URL.
pub const BASE_URL: &str = "WHATSAPP_BASE_URL";
/// Request timeout in seconds.
pub const TIMEOUT: &str = "WHATSAPP_TIMEOUT";
/// Attempts per request.
pub const MAX_RETRIES: &str = "WHATSAPP_MAX_RETRIES";
/// TLS certificate verification.
pub const VERIFY_SSL: &str = "WHATSAPP_VERIFY_SSL";
/// Debug logging.
pub const DEBUG: &str = "WHATSAPP_DEBUG";
/// Connection pool size.
pub const POOL_SIZE: &str = "WHATSAPP_POOL_SIZE";
/// Calls per second.
pub const RATE_LIMIT: &str = "WHATSAPP_RATE_LIMIT";

/// Raw `WHATSAPP_*` values. Empty variables count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Captures the relevant variables from `vars`.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, v)| k.starts_with("WHATSAPP_") && !v.trim().is_empty())
            .collect();
        Self { vars }
    }

    /// Captures the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Returns the trimmed value of `var`, if set.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&str> {
        self.vars.get(var).map(|v| v.trim())
    }

    /// Returns true if no `WHATSAPP_*` variable is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Parses a boolean flag value.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`, ignoring
/// case.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
