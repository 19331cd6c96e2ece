//! Configuration management for review-notify
//!
//! Layered configuration loading with support for:
//! - TOML configuration files
//! - Environment variable overrides
//! - Profile overlays (`development.toml` over `default.toml`)
//!
//! # Configuration Priority (lowest to highest)
//! 1. `default.toml` - Base default configuration
//! 2. `{environment}.toml` - Environment-specific configuration
//! 3. `local.toml` - Local overrides (not committed to version control)
//! 4. `REVIEW_NOTIFY_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use loader::ConfigLoader;
pub use settings::{
    ChannelConfig, ReconnectConfig, SessionConfig, Settings, ToastConfig, ToastSurfaceKind,
    WebhookToastConfig,
};

/// Serializes tests that read or mutate `REVIEW_NOTIFY_*` process variables
#[cfg(test)]
pub(crate) static ENV_TEST_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
