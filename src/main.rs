//! wa-cloud: WhatsApp Cloud API command-line client
//!
//! Entry point for the wa-cloud application.

use std::process::ExitCode;

use whatsapp_cloud::config::{
    Cli, Command, EnvConfig, ValidatedConfig, WebhookSecrets, write_default_config,
};

mod app;
mod run;

use app::{debug_from_env, exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Handle init subcommand
    if let Command::Init { output } = &cli.command {
        return handle_init(output);
    }

    let env = EnvConfig::from_process();

    if cli.is_offline() {
        return handle_offline(&cli, &env);
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli, &env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.debug);
    tracing::debug!("{config}");

    run_application(config, cli.command)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Handles the webhook commands, which need no account credentials.
fn handle_offline(cli: &Cli, env: &EnvConfig) -> ExitCode {
    let secrets = match WebhookSecrets::load(cli, env) {
        Ok(secrets) => secrets,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(cli.verbose || debug_from_env(env));

    report(run::run_offline(&secrets.into_verifier(), &cli.command))
}

/// Runs an API command with the given configuration.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: ValidatedConfig, command: Command) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    report(runtime.block_on(run::execute(config, command)))
}

fn report(result: Result<String, run::RunError>) -> ExitCode {
    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            exit_code::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            exit_code::runtime_error()
        }
    }
}
