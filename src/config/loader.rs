//! Configuration loader for review-notify
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "REVIEW_NOTIFY_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "REVIEW_NOTIFY_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "REVIEW_NOTIFY";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. `default.toml` - Base default configuration (required when
///    `REVIEW_NOTIFY_CONFIG_DIR` is set, optional otherwise)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local development overrides (optional)
/// 4. `REVIEW_NOTIFY_*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Whether the directory was chosen explicitly; only then is `default.toml` required
    config_dir_explicit: bool,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
    /// Current application environment
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader
    ///
    /// This reads environment variables to determine:
    /// - Configuration directory (`REVIEW_NOTIFY_CONFIG_DIR`)
    /// - Specific configuration file (`REVIEW_NOTIFY_CONFIG_FILE`)
    /// - Application environment (`REVIEW_NOTIFY_APP_ENV`)
    ///
    /// # Errors
    ///
    /// Returns an error if both `REVIEW_NOTIFY_CONFIG_DIR` and `REVIEW_NOTIFY_CONFIG_FILE` are set,
    /// as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let explicit_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_dir_explicit = explicit_dir.is_some();
        let config_dir = explicit_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        // Check mutual exclusivity
        if config_file.is_some() && config_dir_explicit {
            return Err(ConfigError::mutual_exclusivity(
                "REVIEW_NOTIFY_CONFIG_DIR and REVIEW_NOTIFY_CONFIG_FILE cannot both be set. \
                 Use REVIEW_NOTIFY_CONFIG_DIR for layered configuration or \
                 REVIEW_NOTIFY_CONFIG_FILE for a single configuration file.",
            ));
        }

        let environment = AppEnvironment::from_env()?;

        Ok(Self {
            config_dir,
            config_dir_explicit,
            config_file,
            environment,
        })
    }

    /// Loader for a single configuration file, ignoring the environment's directory settings
    ///
    /// # Errors
    ///
    /// Returns an error if `REVIEW_NOTIFY_APP_ENV` names no known profile.
    pub fn for_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_dir_explicit: false,
            config_file: Some(path.into()),
            environment: AppEnvironment::from_env()?,
        })
    }

    /// Override the environment read from `REVIEW_NOTIFY_APP_ENV`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Load configuration from all sources
    ///
    /// If `REVIEW_NOTIFY_CONFIG_FILE` is set, loads only that file.
    /// Otherwise, performs layered loading from the configuration directory.
    /// The returned settings carry the profile they were loaded for.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` is not found in an explicitly configured directory
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let mut settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;
        settings.environment = self.environment;

        // Validate the loaded settings
        settings.validate()?;

        Ok(settings)
    }

    /// Build the config::Config instance from all sources
    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            // Single file mode
            self.add_file_source(builder, config_file, true)?
        } else {
            // Layered loading mode
            self.build_layered_config(builder)?
        };

        // Add environment variables (always highest priority)
        // Note: Environment variables are case-insensitive and converted to lowercase
        // REVIEW_NOTIFY_RECONNECT__MAX_RECONNECTS -> reconnect.max_reconnects
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    /// Build layered configuration from multiple files
    fn build_layered_config(
        &self,
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        // 1. Add default.toml (required only for an explicit directory)
        let default_path = self.config_dir.join("default.toml");
        let builder = self.add_file_source(builder, &default_path, self.config_dir_explicit)?;

        // 2. Add {environment}.toml (optional)
        let env_path = self.config_dir.join(self.environment.overlay_file());
        let builder = self.add_file_source(builder, &env_path, false)?;

        // 3. Add local.toml (optional)
        let local_path = self.config_dir.join("local.toml");
        let builder = self.add_file_source(builder, &local_path, false)?;

        Ok(builder)
    }

    /// Add a file source to the config builder
    ///
    /// # Arguments
    ///
    /// * `builder` - The config builder to add the source to
    /// * `path` - Path to the configuration file
    /// * `required` - Whether the file is required to exist
    fn add_file_source(
        &self,
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        // Only add the file if it exists or is required
        // For optional files, we use File::new with required(false)
        Ok(builder.add_source(
            File::new(path.to_str().unwrap_or_default(), FileFormat::Toml).required(required),
        ))
    }

    /// Add environment variable source to the config builder
    ///
    /// Environment variables with prefix `REVIEW_NOTIFY_` are mapped to configuration keys.
    /// Double underscores (`__`) are used as separators for nested keys.
    ///
    /// Examples:
    /// - `REVIEW_NOTIFY_CHANNEL__URL` -> `channel.url`
    /// - `REVIEW_NOTIFY_SESSION__TOKEN` -> `session.token`
    fn add_env_source(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_dir_explicit: false,
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}
