//! Configuration profile selection
//!
//! The profile decides which overlay sits between `default.toml` and
//! `local.toml`. Installed listeners run `production`, which ships no overlay
//! and so runs on `default.toml` alone. `development` adds
//! `development.toml`, which points the channel at a local server.

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Configuration profile of the listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local server, verbose defaults
    #[value(name = "development", alias = "dev")]
    Development,
    /// End-user install
    #[default]
    #[value(name = "production", alias = "prod")]
    Production,
}

impl Environment {
    /// Environment variable that selects the profile
    pub const ENV_VAR: &'static str = "REVIEW_NOTIFY_APP_ENV";

    /// Read the profile from `REVIEW_NOTIFY_APP_ENV`
    ///
    /// Unset or empty means `Production`. A value that names no profile is an
    /// error rather than a silent fallback, so a typo never drops the overlay.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// File name of this profile's overlay inside the config directory
    pub fn overlay_file(&self) -> String {
        format!("{}.toml", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::EnvVarError(format!(
                "Invalid {} '{}'. Valid values are: development, production",
                Self::ENV_VAR,
                s
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_names_and_aliases() {
        for (input, expected) in [
            ("development", Environment::Development),
            ("dev", Environment::Development),
            (" Dev ", Environment::Development),
            ("PRODUCTION", Environment::Production),
            ("prod", Environment::Production),
        ] {
            assert_eq!(input.parse::<Environment>().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_unshipped_profiles_are_rejected() {
        for input in ["staging", "test", ""] {
            let err = input.parse::<Environment>().unwrap_err();
            assert!(err.to_string().contains(Environment::ENV_VAR), "{input}");
        }
    }

    #[test]
    fn test_overlay_file_names() {
        assert_eq!(Environment::Development.overlay_file(), "development.toml");
        assert_eq!(Environment::Production.overlay_file(), "production.toml");
        assert_eq!(Environment::default(), Environment::Production);
    }

    #[test]
    fn test_from_env() {
        let _guard = crate::config::ENV_TEST_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let original = std::env::var(Environment::ENV_VAR).ok();

        unsafe { std::env::remove_var(Environment::ENV_VAR) };
        assert_eq!(Environment::from_env().unwrap(), Environment::Production);

        unsafe { std::env::set_var(Environment::ENV_VAR, "dev") };
        assert_eq!(Environment::from_env().unwrap(), Environment::Development);

        unsafe { std::env::set_var(Environment::ENV_VAR, "qa") };
        assert!(matches!(
            Environment::from_env(),
            Err(ConfigError::EnvVarError(_))
        ));

        unsafe {
            match original {
                Some(value) => std::env::set_var(Environment::ENV_VAR, value),
                None => std::env::remove_var(Environment::ENV_VAR),
            }
        }
    }
}
