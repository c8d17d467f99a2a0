//! Validated configuration after merging CLI, environment and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::client::Credentials;
use crate::transport::TransportSettings;
use crate::webhook::WebhookVerifier;

use super::cli::Cli;
use super::defaults;
use super::env::{self, EnvConfig, parse_bool};
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args, an
/// environment snapshot and an optional TOML config. The function
/// validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Account identifiers and secrets
    pub credentials: Credentials,

    /// Transport settings
    pub transport: TransportSettings,

    /// Debug logging requested (`--verbose`, `WHATSAPP_DEBUG` or `logging.debug`)
    pub debug: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |present: bool| if present { "set" } else { "unset" };

        write!(
            f,
            "Config {{ phone_number_id: {}, business_account_id: {}, api: {}{}, timeout: {}s, \
             max_retries: {}, rate_limit: {}/s, pool_size: {}, verify_tls: {}, app_secret: {}, \
             verify_token: {}, debug: {} }}",
            self.credentials.phone_number_id(),
            self.credentials.business_account_id().unwrap_or("none"),
            self.transport.base_url,
            self.transport.api_version,
            self.transport.timeout.as_secs(),
            self.transport.max_retries,
            self.transport.rate_limit,
            self.transport.pool_size,
            self.transport.verify_tls,
            set(self.credentials.app_secret().is_some()),
            set(self.credentials.webhook_verify_token().is_some()),
            self.debug,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from all sources.
    ///
    /// Priority: CLI > environment > TOML > defaults. Secrets are never
    /// taken from the CLI.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The phone number id or access token is missing
    /// - An environment variable cannot be parsed
    /// - The base URL is invalid
    /// - Timeout, retries, rate limit or pool size are out of range
    pub fn from_raw(
        cli: &Cli,
        env: &EnvConfig,
        toml: Option<&TomlConfig>,
    ) -> Result<Self, ConfigError> {
        let credentials = Self::resolve_credentials(cli, env, toml)?;
        let transport = Self::resolve_transport(cli, env, toml)?;
        let debug = cli.verbose
            || layered_bool(None, env, env::DEBUG, toml.and_then(|t| t.logging.debug), defaults::DEBUG)?;

        Ok(Self {
            credentials,
            transport,
            debug,
        })
    }

    /// Loads and merges configuration from CLI, environment and optional
    /// config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli, env: &EnvConfig) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, env, toml.as_ref())
    }

    fn resolve_credentials(
        cli: &Cli,
        env: &EnvConfig,
        toml: Option<&TomlConfig>,
    ) -> Result<Credentials, ConfigError> {
        let account = toml.map(|t| &t.account);

        let phone_number_id = layered_string(
            cli.phone_number_id.as_deref(),
            env,
            env::PHONE_NUMBER_ID,
            account.and_then(|a| a.phone_number_id.as_deref()),
        )
        .ok_or_else(|| {
            ConfigError::missing(
                field::PHONE_NUMBER_ID,
                "Use --phone-number-id, WHATSAPP_PHONE_NUMBER_ID or account.phone_number_id",
            )
        })?;

        let access_token = layered_string(
            None,
            env,
            env::ACCESS_TOKEN,
            account.and_then(|a| a.access_token.as_deref()),
        )
        .ok_or_else(|| {
            ConfigError::missing(
                field::ACCESS_TOKEN,
                "Set WHATSAPP_ACCESS_TOKEN or account.access_token in config file",
            )
        })?;

        let mut credentials = Credentials::new(phone_number_id, SecretString::new(access_token));
        let secrets = WebhookSecrets::resolve(env, toml);
        if let Some(secret) = secrets.app_secret {
            credentials = credentials.with_app_secret(secret);
        }
        if let Some(token) = secrets.verify_token {
            credentials = credentials.with_webhook_verify_token(token);
        }
        if let Some(id) = layered_string(
            cli.business_account_id.as_deref(),
            env,
            env::BUSINESS_ACCOUNT_ID,
            account.and_then(|a| a.business_account_id.as_deref()),
        ) {
            credentials = credentials.with_business_account_id(id);
        }

        Ok(credentials)
    }

    fn resolve_transport(
        cli: &Cli,
        env: &EnvConfig,
        toml: Option<&TomlConfig>,
    ) -> Result<TransportSettings, ConfigError> {
        let api = toml.map(|t| &t.api);
        let http = toml.map(|t| &t.http);

        let base_url = Self::resolve_base_url(cli, env, toml)?;

        let api_version = layered_string(
            cli.api_version.as_deref(),
            env,
            env::API_VERSION,
            api.and_then(|a| a.version.as_deref()),
        )
        .unwrap_or_else(|| defaults::API_VERSION.to_string());
        if api_version.trim_matches('/').is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_version",
                reason: "must not be empty".to_string(),
            });
        }

        let timeout = Self::resolve_timeout(cli, env, toml)?;

        let max_retries = layered(
            cli.max_retries,
            env,
            env::MAX_RETRIES,
            http.and_then(|h| h.max_retries),
            defaults::MAX_RETRIES,
        )?;
        if max_retries > defaults::MAX_RETRIES_LIMIT {
            return Err(ConfigError::OutOfRange {
                field: "max_retries",
                value: u64::from(max_retries),
                expected: "0 to 10",
            });
        }

        let rate_limit = layered(
            cli.rate_limit,
            env,
            env::RATE_LIMIT,
            http.and_then(|h| h.rate_limit),
            defaults::RATE_LIMIT,
        )?;
        if rate_limit == 0 || rate_limit > defaults::MAX_RATE_LIMIT {
            return Err(ConfigError::OutOfRange {
                field: "rate_limit",
                value: u64::from(rate_limit),
                expected: "1 to 1000",
            });
        }

        let pool_size = layered(
            cli.pool_size,
            env,
            env::POOL_SIZE,
            http.and_then(|h| h.pool_size),
            defaults::POOL_SIZE,
        )?;
        if pool_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "pool_size",
                value: 0,
                expected: "at least 1",
            });
        }

        // --insecure only disables verification
        let verify_tls = if cli.insecure {
            false
        } else {
            layered_bool(
                None,
                env,
                env::VERIFY_SSL,
                http.and_then(|h| h.verify_ssl),
                defaults::VERIFY_TLS,
            )?
        };

        Ok(TransportSettings {
            base_url,
            api_version,
            timeout,
            max_retries,
            verify_tls,
            pool_size,
            rate_limit,
        })
    }

    fn resolve_base_url(
        cli: &Cli,
        env: &EnvConfig,
        toml: Option<&TomlConfig>,
    ) -> Result<Url, ConfigError> {
        let Some(raw) = layered_string(
            cli.base_url.as_deref(),
            env,
            env::BASE_URL,
            toml.and_then(|t| t.api.base_url.as_deref()),
        ) else {
            return Ok(defaults::base_url());
        };

        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: raw,
                reason: "must be an absolute http or https URL".to_string(),
            });
        }
        Ok(url)
    }

    fn resolve_timeout(
        cli: &Cli,
        env: &EnvConfig,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > env > TOML > default
        let seconds = layered(
            cli.timeout,
            env,
            env::TIMEOUT,
            toml.and_then(|t| t.http.timeout),
            defaults::TIMEOUT_SECS,
        )?;

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }
        if seconds > defaults::MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: format!("must be at most {} seconds", defaults::MAX_TIMEOUT_SECS),
            });
        }

        Ok(Duration::from_secs(seconds))
    }
}

/// Webhook secrets, which are resolvable without account credentials.
#[derive(Debug, Clone, Default)]
pub struct WebhookSecrets {
    /// App secret for signature verification
    pub app_secret: Option<SecretString>,
    /// Handshake verify token
    pub verify_token: Option<SecretString>,
}

impl WebhookSecrets {
    /// Resolves the secrets from environment, then TOML.
    #[must_use]
    pub fn resolve(env: &EnvConfig, toml: Option<&TomlConfig>) -> Self {
        let account = toml.map(|t| &t.account);
        let app_secret = layered_string(
            None,
            env,
            env::APP_SECRET,
            account.and_then(|a| a.app_secret.as_deref()),
        );
        let verify_token = layered_string(
            None,
            env,
            env::WEBHOOK_VERIFY_TOKEN,
            account.and_then(|a| a.webhook_verify_token.as_deref()),
        );

        Self {
            app_secret: app_secret.map(SecretString::new),
            verify_token: verify_token.map(SecretString::new),
        }
    }

    /// Loads the optional config file named by `cli.config` and resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load(cli: &Cli, env: &EnvConfig) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Ok(Self::resolve(env, toml.as_ref()))
    }

    /// Builds a verifier from these secrets.
    #[must_use]
    pub fn into_verifier(self) -> WebhookVerifier {
        WebhookVerifier::new(self.app_secret, self.verify_token)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn load_toml(cli: &Cli) -> Result<Option<TomlConfig>, ConfigError> {
    cli.config.as_deref().map(TomlConfig::load).transpose()
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn layered_string(
    cli: Option<&str>,
    env: &EnvConfig,
    var: &'static str,
    toml: Option<&str>,
) -> Option<String> {
    cli.and_then(non_blank)
        .or_else(|| env.get(var).and_then(non_blank))
        .or_else(|| toml.and_then(non_blank))
}

fn layered<T>(
    cli: Option<T>,
    env: &EnvConfig,
    var: &'static str,
    toml: Option<T>,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Some(value) = cli {
        return Ok(value);
    }
    if let Some(raw) = env.get(var) {
        return raw
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid_env(var, raw, e.to_string()));
    }
    Ok(toml.unwrap_or(default))
}

fn layered_bool(
    cli: Option<bool>,
    env: &EnvConfig,
    var: &'static str,
    toml: Option<bool>,
    default: bool,
) -> Result<bool, ConfigError> {
    if let Some(value) = cli {
        return Ok(value);
    }
    if let Some(raw) = env.get(var) {
        return parse_bool(raw)
            .ok_or_else(|| ConfigError::invalid_env(var, raw, "expected true or false"));
    }
    Ok(toml.unwrap_or(default))
}
