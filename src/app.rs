//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use whatsapp_cloud::config::{ConfigError, EnvConfig, env, field};

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, missing credentials, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - network failure, API error, bad signature, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::MissingRequired { field: f, .. } => {
            if *f == field::PHONE_NUMBER_ID || *f == field::ACCESS_TOKEN {
                eprintln!(
                    "\nSet WHATSAPP_{} or run 'wa-cloud init' to generate a configuration template.",
                    f.to_uppercase()
                );
            }
        }
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'wa-cloud init' to generate a configuration template.");
        }
        _ => {}
    }
}

/// Returns true if `WHATSAPP_DEBUG` asks for debug logging.
///
/// Used before the full configuration is available; unparseable values
/// count as off.
pub fn debug_from_env(env: &EnvConfig) -> bool {
    env.get(env::DEBUG)
        .and_then(env::parse_bool)
        .unwrap_or(false)
}

/// Sets up the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over the level chosen here.
pub fn setup_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
