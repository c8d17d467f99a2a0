//! Configuration layer for wa-cloud.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - Environment snapshot ([`EnvConfig`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **Environment** - `WHATSAPP_*` variables
//! 3. **TOML config file** - Values from the configuration file
//! 4. **Built-in defaults** - Hardcoded default values
//!
//! Secrets (access token, app secret, webhook verify token) have no CLI
//! flags: they come from the environment or the config file.
//!
//! # Boolean Flag Semantics
//!
//! `--verbose` and `--insecure` only enable: `--verbose` turns debug
//! logging on regardless of `WHATSAPP_DEBUG`, and `--insecure` turns TLS
//! verification off regardless of `WHATSAPP_VERIFY_SSL`.

mod cli;
pub mod defaults;
pub mod env;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use env::EnvConfig;
pub use error::{ConfigError, field};
pub use toml::{
    AccountSection, ApiSection, HttpSection, LoggingSection, TomlConfig, default_config_template,
};
pub use validated::{ValidatedConfig, WebhookSecrets, write_default_config};
