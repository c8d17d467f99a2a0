//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with environment and CLI values.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Account identifiers and secrets
    #[serde(default)]
    pub account: AccountSection,

    /// API endpoint selection
    #[serde(default)]
    pub api: ApiSection,

    /// HTTP transport tuning
    #[serde(default)]
    pub http: HttpSection,

    /// Logging options
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Account section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSection {
    /// Business phone number id
    pub phone_number_id: Option<String>,

    /// Access token
    pub access_token: Option<String>,

    /// App secret for webhook signature verification
    pub app_secret: Option<String>,

    /// Token expected in the webhook subscription handshake
    pub webhook_verify_token: Option<String>,

    /// WhatsApp Business Account id, needed for template management
    pub business_account_id: Option<String>,
}

/// API section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// Graph API version, e.g. "v23.0"
    pub version: Option<String>,

    /// API root URL
    pub base_url: Option<String>,
}

/// HTTP section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Attempts per request
    pub max_retries: Option<u32>,

    /// Verify TLS certificates
    pub verify_ssl: Option<bool>,

    /// Idle connections per host
    pub pool_size: Option<usize>,

    /// Calls per rolling second
    pub rate_limit: Option<u32>,
}

/// Logging section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable debug logging
    pub debug: Option<bool>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# wa-cloud configuration file
#
# Priority: command-line flags > WHATSAPP_* environment variables > this file > defaults.
# Secrets may also come from WHATSAPP_ACCESS_TOKEN, WHATSAPP_APP_SECRET and
# WHATSAPP_WEBHOOK_VERIFY_TOKEN; they are never accepted as flags.

[account]
# Business phone number id (required)
# phone_number_id = "123456789012345"

# Access token (required)
# access_token = "EAAG..."

# App secret, used to verify X-Hub-Signature-256 on webhooks
# app_secret = "..."

# Token you chose when subscribing the webhook
# webhook_verify_token = "..."

# WhatsApp Business Account id (needed for templates)
# business_account_id = "..."

[api]
# Graph API version (default: v23.0)
# version = "v23.0"

# API root (default: https://graph.facebook.com)
# base_url = "https://graph.facebook.com"

[http]
# Request timeout in seconds, 1 to 300 (default: 30)
# timeout = 30

# Attempts per request, 0 to 10 (default: 3)
# max_retries = 3

# Verify TLS certificates (default: true)
# verify_ssl = true

# Idle connections per host (default: 100)
# pool_size = 100

# Outbound calls per second, 1 to 1000 (default: 80)
# rate_limit = 80

[logging]
# Debug logging (default: false, also enabled by --verbose)
# debug = false
"#
    .to_string()
}
