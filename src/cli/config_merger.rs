//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Configuration merger that handles CLI argument integration with file-based configuration
///
/// CLI arguments override configuration file and environment values.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration for the parsed CLI
    ///
    /// `--config` selects single-file mode; otherwise the layered loader runs,
    /// with `--env` overriding `REVIEW_NOTIFY_APP_ENV`.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match &cli.config {
            Some(path) => {
                Self::validate_config_file_access(path)?;
                ConfigLoader::for_file(path)?
            }
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.with_environment(env),
            None => loader,
        };

        Ok(Self::new(loader.load()?))
    }

    /// Validate that the configuration file is accessible and readable
    fn validate_config_file_access(path: &Path) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::validation(
                "config_file",
                format!("Configuration file does not exist: '{}'", path.display()),
            ));
        }

        std::fs::File::open(path).map(|_| ()).map_err(|e| {
            ConfigError::validation(
                "config_file",
                format!("Cannot read configuration file '{}': {}", path.display(), e),
            )
        })
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// 1. CLI arguments have highest priority
    /// 2. Command-specific `--log-level` beats global `--verbose`/`--quiet`
    ///
    /// The merged configuration is validated again.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        self.apply_global_overrides(&mut config, cli);

        if let Some(ref command) = cli.command {
            self.apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_global_overrides(&self, config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    fn apply_command_overrides(&self, config: &mut Settings, command: &Commands) {
        match command {
            Commands::Listen {
                url,
                namespace,
                token_file,
                max_reconnects,
                log_level,
                dry_run: _,
            } => {
                if let Some(url) = url {
                    config.channel.url = url.clone();
                }

                if let Some(namespace) = namespace {
                    config.channel.namespace = namespace.clone();
                }

                // An explicit session file replaces any token from config
                if let Some(path) = token_file {
                    config.session.token = None;
                    config.session.token_file = Some(path.to_string_lossy().into_owned());
                }

                if let Some(max) = max_reconnects {
                    config.reconnect.max_reconnects = *max;
                }

                if let Some(level) = log_level {
                    config.logger.level = level.clone().into();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use clap::Parser;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli)
    }

    #[test]
    fn test_merge_verbose_and_quiet() {
        assert_eq!(merge(&["review-notify", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["review-notify", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_merge_listen_overrides() {
        let merged = merge(&[
            "review-notify",
            "listen",
            "--url",
            "https://review.example.com",
            "--namespace",
            "/alerts",
            "--max-reconnects",
            "9",
        ])
        .unwrap();

        assert_eq!(merged.channel.url, "https://review.example.com");
        assert_eq!(merged.channel.namespace, "/alerts");
        assert_eq!(merged.reconnect.max_reconnects, 9);
    }

    #[test]
    fn test_token_file_replaces_inline_token() {
        let mut base = Settings::default();
        base.session.token = Some("inline".to_string());
        let cli = Cli::try_parse_from([
            "review-notify",
            "listen",
            "--token-file",
            "/tmp/session.json",
        ])
        .unwrap();

        let merged = ConfigurationMerger::new(base).merge_cli_args(&cli).unwrap();
        assert!(merged.session.token.is_none());
        assert_eq!(merged.session.token_file.as_deref(), Some("/tmp/session.json"));
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let merged = merge(&["review-notify", "--verbose", "listen", "--log-level", "warn"]).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_from_cli_with_config_file() {
        let _guard = crate::config::ENV_TEST_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[reconnect]\nmax_reconnects = 2\n").unwrap();

        let cli = Cli::try_parse_from(["review-notify", "--config", path.to_str().unwrap()])
            .unwrap();
        let merged = ConfigurationMerger::from_cli(&cli)
            .unwrap()
            .merge_cli_args(&cli)
            .unwrap();
        assert_eq!(merged.reconnect.max_reconnects, 2);
    }

    #[test]
    fn test_from_cli_records_env_override() {
        let _guard = crate::config::ENV_TEST_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[reconnect]\nmax_reconnects = 2\n").unwrap();

        let cli = Cli::try_parse_from([
            "review-notify",
            "--config",
            path.to_str().unwrap(),
            "--env",
            "dev",
        ])
        .unwrap();
        let merged = ConfigurationMerger::from_cli(&cli)
            .unwrap()
            .merge_cli_args(&cli)
            .unwrap();
        assert_eq!(merged.environment, Environment::Development);
    }
}
