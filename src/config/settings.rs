//! Configuration settings structures for review-notify
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::ReconnectPolicy;
use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};
use crate::notifications::{ToastLevel, ToastOptions};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "review-notify".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_channel_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_namespace() -> String {
    "/notifications".to_string()
}

fn default_event_name() -> String {
    "notification".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_reconnects() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_toast_duration_ms() -> u64 {
    5_000
}

fn default_toast_level() -> String {
    "info".to_string()
}

fn default_webhook_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/review-notify.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Channel Configuration
// ============================================================================

/// Push endpoint the notification channel connects to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Base URL of the backend (`http`, `https`, `ws` or `wss`)
    #[serde(default = "default_channel_url")]
    pub url: String,

    /// Socket.IO namespace notifications are published on
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Name of the inbound event carrying a notification
    #[serde(default = "default_event_name")]
    pub event: String,

    /// Connect timeout in seconds, covering TCP, TLS and the namespace handshake
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl ChannelConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: default_channel_url(),
            namespace: default_namespace(),
            event: default_event_name(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

// ============================================================================
// Reconnect Configuration
// ============================================================================

/// Reconnection backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Retries allowed after the initial attempt before giving up
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: u32,

    /// Delay before the first retry in milliseconds; doubles per retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for a single retry delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Keep retrying when the server rejects the credential
    #[serde(default = "default_true")]
    pub retry_on_auth_failure: bool,
}

impl ReconnectConfig {
    /// Build the runtime policy used by the channel
    pub fn to_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.max_reconnects,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
        .with_retry_on_auth_failure(self.retry_on_auth_failure)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_reconnects: default_max_reconnects(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            retry_on_auth_failure: true,
        }
    }
}

// ============================================================================
// Session Configuration
// ============================================================================

/// Where the bearer credential comes from
///
/// `token` wins over `token_file`. Prefer setting the token through
/// `REVIEW_NOTIFY_SESSION__TOKEN` rather than committing it to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Inline bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Path to a persisted session file (JSON with a `token` field, or plain text)
    #[serde(default)]
    pub token_file: Option<String>,
}

// ============================================================================
// Toast Configuration
// ============================================================================

/// Toast surface implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastSurfaceKind {
    #[default]
    Console,
    Webhook,
}

/// Webhook toast surface configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookToastConfig {
    /// Target URL receiving one POST per toast
    #[serde(default)]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,

    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for WebhookToastConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_seconds: default_webhook_timeout(),
            headers: HashMap::new(),
        }
    }
}

/// Toast presentation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastConfig {
    /// Whether inbound notifications are presented as toasts
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Which surface presents the toast
    #[serde(default)]
    pub surface: ToastSurfaceKind,

    /// How long a toast stays visible, in milliseconds
    #[serde(default = "default_toast_duration_ms")]
    pub duration_ms: u64,

    /// Toast level: "info", "success", "warning", "error"
    #[serde(default = "default_toast_level")]
    pub level: String,

    /// Webhook surface settings
    #[serde(default)]
    pub webhook: WebhookToastConfig,
}

impl ToastConfig {
    /// Options passed to every `Toaster::show` call
    pub fn to_options(&self) -> Result<ToastOptions, ConfigError> {
        let level = self
            .level
            .parse::<ToastLevel>()
            .map_err(|e| ConfigError::validation("toast.level", e))?;
        Ok(ToastOptions {
            level,
            duration: Duration::from_millis(self.duration_ms),
            title: None,
        })
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            surface: ToastSurfaceKind::default(),
            duration_ms: default_toast_duration_ms(),
            level: default_toast_level(),
            webhook: WebhookToastConfig::default(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to the runtime LoggerConfig
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format)
            .map_err(|e| ConfigError::validation("logger.file", e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Push endpoint
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Reconnection backoff
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Credential source
    #[serde(default)]
    pub session: SessionConfig,

    /// Toast presentation
    #[serde(default)]
    pub toast: ToastConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Profile the settings were loaded for; set by the loader, never read from files
    #[serde(skip)]
    pub environment: Environment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(content: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.channel.namespace, "/notifications");
        assert_eq!(settings.channel.connect_timeout(), Duration::from_secs(10));
        assert_eq!(settings.reconnect.max_reconnects, 5);
        assert_eq!(settings.reconnect.base_delay_ms, 1_000);
        assert_eq!(settings.reconnect.max_delay_ms, 30_000);
        assert!(settings.reconnect.retry_on_auth_failure);
        assert!(settings.session.token.is_none());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(from_toml(""), Settings::default());
    }

    #[test]
    fn test_partial_sections_fill_in_defaults() {
        let settings = from_toml(
            r#"
[channel]
url = "https://review.example.com"

[reconnect]
max_reconnects = 2
retry_on_auth_failure = false

[toast]
surface = "webhook"

[toast.webhook]
url = "https://hooks.example.com/toast"
"#,
        );

        assert_eq!(settings.channel.url, "https://review.example.com");
        assert_eq!(settings.channel.event, "notification");
        assert_eq!(settings.reconnect.max_reconnects, 2);
        assert_eq!(settings.reconnect.max_delay_ms, 30_000);
        assert!(!settings.reconnect.retry_on_auth_failure);
        assert_eq!(settings.toast.surface, ToastSurfaceKind::Webhook);
        assert_eq!(settings.toast.webhook.timeout_seconds, 10);
    }

    #[test]
    fn test_reconnect_config_to_policy() {
        let config = ReconnectConfig {
            max_reconnects: 3,
            base_delay_ms: 500,
            max_delay_ms: 4_000,
            retry_on_auth_failure: false,
        };
        let policy = config.to_policy();

        assert_eq!(policy.max_reconnects(), 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(5), Duration::from_millis(4_000));
        assert!(!policy.retry_on_auth_failure());
    }

    #[test]
    fn test_toast_options_from_config() {
        let config = ToastConfig {
            level: "warning".to_string(),
            duration_ms: 2_500,
            ..Default::default()
        };
        let options = config.to_options().unwrap();
        assert_eq!(options.level, ToastLevel::Warning);
        assert_eq!(options.duration, Duration::from_millis(2_500));
    }

    #[test]
    fn test_toast_options_rejects_unknown_level() {
        let config = ToastConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        let err = config.to_options().unwrap_err();
        assert_eq!(err.field(), Some("toast.level"));
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            file: FileSettings {
                enabled: true,
                format: "compact".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = settings.into_logger_config().unwrap();
        assert_eq!(config.level, "debug");
        assert!(config.file.enabled);
        assert_eq!(config.file.format, LogFormat::Compact);
    }

    #[test]
    fn test_logger_settings_invalid_format() {
        let settings = LoggerSettings {
            file: FileSettings {
                format: "xml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.into_logger_config().is_err());
    }
}
