//! Tests for validated configuration.

use secrecy::ExposeSecret;

use super::ConfigError;
use super::cli::Cli;
use super::env::{self, EnvConfig};
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, WebhookSecrets};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["wa-cloud"];
    full_args.extend(args);
    full_args.push("list-templates");
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

/// Environment snapshot from pairs
fn env(vars: &[(&str, &str)]) -> EnvConfig {
    EnvConfig::from_vars(vars.iter().copied())
}

/// Environment holding only the two required values
fn required_env() -> EnvConfig {
    env(&[(env::PHONE_NUMBER_ID, "123"), (env::ACCESS_TOKEN, "env-token")])
}

mod precedence_tests;
