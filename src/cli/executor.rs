//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::ListenCommandHandler;
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};

/// What main.rs should do once the command has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Start the long-running listener
    Listen,
    /// The command already did its work
    Done,
}

/// Execute a CLI command with the given settings
///
/// # Errors
/// Returns errors from command handlers or validation failures
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<CommandOutcome> {
    validate_command_args(cli)?;

    let dry_run = match &cli.command {
        Some(Commands::Listen { dry_run, .. }) => *dry_run,
        None => false,
    };

    ListenCommandHandler::new(settings).execute(dry_run).await
}

fn validate_command_args(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|reason| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason,
    })?;

    if let Some(Commands::Listen {
        max_reconnects: Some(max),
        ..
    }) = &cli.command
        && *max > 20
    {
        eprintln!(
            "Warning: {} reconnects with a 30s ceiling keeps retrying for over {} minutes",
            max,
            max / 2
        );
    }

    Ok(())
}
