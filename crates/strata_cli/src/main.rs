//! Strata CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or missing deployment target
//! - 3: Validation failure
//! - 4: Composition error or duplicate export
//! - 5: Provisioning engine error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands, LogFormat};
use strata_config::{ConfigError, ValidationError};
use strata_core::{AssemblyError, StageError, TargetError};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const COMPOSITION_ERROR: u8 = 4;
    pub const ENGINE_ERROR: u8 = 5;
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strata={},warn", level)));

    let registry = tracing_subscriber::registry().with(filter);
    let log_result = match cli.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::Policy(args) => commands::policy::execute(args).await,
        Commands::Synth(args) => commands::synth::execute(args).await,
        Commands::Deploy(args) => commands::deploy::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn stage_exit_code(source: &StageError) -> u8 {
    match source {
        StageError::Validation(_) => ExitCodes::VALIDATION_FAILURE,
        StageError::Composition(_) | StageError::DuplicateExport(_) | StageError::Resolution(_) => {
            ExitCodes::COMPOSITION_ERROR
        }
        StageError::Engine(_) => ExitCodes::ENGINE_ERROR,
        StageError::InvalidTransition { .. } | StageError::Io(_) | StageError::Json(_) => {
            ExitCodes::GENERAL_ERROR
        }
    }
}

/// Map the first recognized error in the chain to an exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<AssemblyError>() {
            return stage_exit_code(&err.source);
        }
        if cause.downcast_ref::<TargetError>().is_some() {
            return ExitCodes::INVALID_ARGS;
        }
        if cause.downcast_ref::<ValidationError>().is_some() {
            return ExitCodes::VALIDATION_FAILURE;
        }
        if let Some(err) = cause.downcast_ref::<ConfigError>() {
            return match err {
                ConfigError::NotFound(_) | ConfigError::UnsupportedFormat(_) => {
                    ExitCodes::INVALID_ARGS
                }
                ConfigError::Io(_) => ExitCodes::GENERAL_ERROR,
                _ => ExitCodes::VALIDATION_FAILURE,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}
