//! Review explorer CLI entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use review_explorer::{ExplorerConfig, ExplorerError, OperationMode};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ExplorerError> {
    let config = load_config()?;
    config.validate()?;

    match config.operation_mode()? {
        OperationMode::Quotas => cli::quotas::run(&config),
        OperationMode::Catalog => cli::catalog::run(&config),
        OperationMode::Products => cli::products::run(&config),
        OperationMode::Browse => cli::browse::run(&config),
        OperationMode::Export => cli::export::run(&config),
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ExplorerError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ExplorerConfig, ExplorerError> {
    ExplorerConfig::load().map_err(|error| ExplorerError::Configuration {
        message: error.to_string(),
    })
}

/// Diagnostics go to stderr so stdout stays clean for exported data.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let initialised = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
    if initialised.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
