//! Agentform: declarative multi-agent LLM pipelines.
//!
//! This is the main entry point for the `agentform` CLI. It parses arguments,
//! installs logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

use agentform::cli::Cli;
use agentform::commands;
use agentform::error::Result;
use agentform::exit_codes;
use agentform::logging::{LoggingConfig, init_logging};
use std::process::ExitCode;

fn run(cli: Cli) -> Result<()> {
    let logging = LoggingConfig::from_args(
        cli.global.log_level.as_deref(),
        cli.global.log_format.as_deref(),
    )?;
    init_logging(&logging)?;
    commands::dispatch(cli)
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
