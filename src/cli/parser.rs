//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Environment;

/// Real-time notification listener for the performance review platform
#[derive(Parser, Debug)]
#[command(name = "review-notify")]
#[command(about = "Real-time notification listener for the performance review platform")]
#[command(long_about = "
review-notify keeps a live Socket.IO connection to the review platform's
notification namespace, reconnects with bounded exponential backoff, and
presents every pushed notification as a toast.

EXAMPLES:
    # Listen with default configuration
    review-notify listen

    # Point at another server and session file
    review-notify listen --url https://review.example.com --token-file ~/.review/session.json

    # Use custom configuration file
    review-notify --config /path/to/config.toml listen

    # Run in development mode with verbose logging
    review-notify --env development --verbose listen

    # Check configuration without connecting
    review-notify listen --dry-run
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered `config/` directory.
    /// The file must exist and be readable.
    ///
    /// Example: --config /etc/review-notify/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override the configuration profile from REVIEW_NOTIFY_APP_ENV
    ///
    /// `development` layers `development.toml` over `default.toml`.
    ///
    /// Available values: development (dev), production (prod)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Listen for notifications (default)
    ///
    /// Connects to the notification namespace with the session credential and
    /// keeps running until Ctrl+C, SIGTERM, or the reconnect policy gives up.
    ///
    /// Examples:
    ///   review-notify listen                              # Start with defaults
    ///   review-notify listen --max-reconnects 10          # Retry longer
    ///   review-notify listen --dry-run                    # Validate config without connecting
    Listen {
        /// Server base URL
        ///
        /// http(s) URLs are switched to ws(s) for the Socket.IO endpoint.
        ///
        /// Default: http://localhost:3000
        #[arg(long, value_name = "URL", value_parser = super::validation::validate_server_url)]
        url: Option<String>,

        /// Socket.IO namespace
        ///
        /// Default: /notifications
        #[arg(long, value_name = "NAMESPACE", value_parser = super::validation::validate_namespace)]
        namespace: Option<String>,

        /// Persisted session file holding the bearer token
        ///
        /// Either JSON with a `token` field or the raw token as plain text.
        #[arg(long, value_name = "FILE")]
        token_file: Option<PathBuf>,

        /// Retries after the initial attempt before giving up
        ///
        /// Default: 5
        #[arg(long, value_name = "COUNT")]
        max_reconnects: Option<u32>,

        /// Log level override
        ///
        /// Overrides both configuration file settings and global --verbose/--quiet flags.
        ///
        /// Available levels: error, warn, info, debug, trace
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        ///
        /// Performs a complete configuration check without connecting.
        /// Returns exit code 0 if valid, non-zero if invalid.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Log level options
#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Validate CLI arguments and provide detailed error messages
    ///
    /// Checks argument combinations clap cannot express on its own.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(Commands::Listen {
            token_file: Some(path),
            ..
        }) = &self.command
            && path.is_dir()
        {
            return Err(format!(
                "Token file path is a directory: '{}'",
                path.display()
            ));
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}
