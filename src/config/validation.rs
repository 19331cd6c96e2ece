//! Configuration validation logic
//!
//! Validation methods for all configuration structures, making sure values
//! are within acceptable ranges and formats before a channel is built.

use reqwest::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{
    ChannelConfig, FileSettings, LoggerSettings, ReconnectConfig, Settings, ToastConfig,
    ToastSurfaceKind,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Schemes accepted for the push endpoint
const VALID_CHANNEL_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// Valid toast levels
const VALID_TOAST_LEVELS: &[&str] = &["info", "success", "warning", "error"];

impl ChannelConfig {
    /// Validate channel configuration
    ///
    /// # Validation Rules
    /// - URL must parse and use http, https, ws or wss
    /// - Namespace must start with `/`
    /// - Event name must not be empty
    /// - Connect timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.url).map_err(|e| {
            ConfigError::validation("channel.url", format!("Invalid URL '{}': {}", self.url, e))
        })?;

        if !VALID_CHANNEL_SCHEMES.contains(&url.scheme()) {
            return Err(ConfigError::validation(
                "channel.url",
                format!(
                    "Unsupported scheme '{}'. Valid schemes are: {}",
                    url.scheme(),
                    VALID_CHANNEL_SCHEMES.join(", ")
                ),
            ));
        }

        if !self.namespace.starts_with('/') {
            return Err(ConfigError::validation(
                "channel.namespace",
                format!("Namespace must start with '/', got '{}'", self.namespace),
            ));
        }

        if self.event.trim().is_empty() {
            return Err(ConfigError::validation(
                "channel.event",
                "Event name cannot be empty.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "channel.connect_timeout",
                "Connect timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl ReconnectConfig {
    /// Validate reconnect configuration
    ///
    /// # Validation Rules
    /// - Base delay must be greater than 0
    /// - Max delay must not be below the base delay
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_delay_ms == 0 {
            return Err(ConfigError::validation(
                "reconnect.base_delay_ms",
                "Base delay must be greater than 0 milliseconds.",
            ));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(ConfigError::validation(
                "reconnect.max_delay_ms",
                format!(
                    "Max delay ({}ms) cannot be lower than base delay ({}ms).",
                    self.max_delay_ms, self.base_delay_ms
                ),
            ));
        }

        Ok(())
    }
}

impl ToastConfig {
    /// Validate toast configuration
    ///
    /// The webhook URL is only checked when the webhook surface is selected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_TOAST_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "toast.level",
                format!(
                    "Invalid toast level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_TOAST_LEVELS.join(", ")
                ),
            ));
        }

        if self.enabled && self.surface == ToastSurfaceKind::Webhook {
            let url = Url::parse(&self.webhook.url).map_err(|_| {
                ConfigError::validation(
                    "toast.webhook.url",
                    "A valid webhook URL is required when the webhook surface is selected.",
                )
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::validation(
                    "toast.webhook.url",
                    "Webhook URL must use http or https.",
                ));
            }
            if self.webhook.timeout_seconds == 0 {
                return Err(ConfigError::validation(
                    "toast.webhook.timeout_seconds",
                    "Webhook timeout must be greater than 0 seconds.",
                ));
            }
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    /// - At least one output must be enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        self.file.validate()?;

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered. A missing credential
    /// is not an error here: the channel simply stays disconnected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel.validate()?;
        self.reconnect.validate()?;
        self.toast.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
