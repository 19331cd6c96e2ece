//! Toast surfaces: transient, non-blocking presentation of a notification.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Visual severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastLevel::Info => "info",
            ToastLevel::Success => "success",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        }
    }
}

impl FromStr for ToastLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(ToastLevel::Info),
            "success" => Ok(ToastLevel::Success),
            "warning" | "warn" => Ok(ToastLevel::Warning),
            "error" => Ok(ToastLevel::Error),
            _ => Err(format!(
                "Invalid toast level '{}'. Valid levels are: info, success, warning, error",
                s
            )),
        }
    }
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation options passed with every toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastOptions {
    pub level: ToastLevel,
    /// How long the toast stays visible
    pub duration: Duration,
    pub title: Option<String>,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            level: ToastLevel::Info,
            duration: Duration::from_secs(5),
            title: None,
        }
    }
}

/// Trait for toast surfaces (console, webhook, desktop bridge, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
#[async_trait]
pub trait Toaster: Send + Sync {
    /// Present `message` once
    async fn show(&self, message: &str, options: &ToastOptions) -> AppResult<()>;

    /// Surface name for logging
    fn name(&self) -> &'static str;
}

/// Prints each toast as one line on stdout
#[derive(Debug, Default)]
pub struct ConsoleToaster;

impl ConsoleToaster {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn render(message: &str, options: &ToastOptions) -> String {
        match &options.title {
            Some(title) => format!("[{}] {}: {}", options.level, title, message),
            None => format!("[{}] {}", options.level, message),
        }
    }
}

#[async_trait]
impl Toaster for ConsoleToaster {
    async fn show(&self, message: &str, options: &ToastOptions) -> AppResult<()> {
        let line = Self::render(message, options);
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line).map_err(|e| AppError::Toast {
            surface: self.name().to_string(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("INFO".parse::<ToastLevel>().unwrap(), ToastLevel::Info);
        assert_eq!("warn".parse::<ToastLevel>().unwrap(), ToastLevel::Warning);
        assert!("fatal".parse::<ToastLevel>().is_err());
    }

    #[test]
    fn test_console_render() {
        let mut options = ToastOptions::default();
        assert_eq!(
            ConsoleToaster::render("Ciclo encerrando", &options),
            "[info] Ciclo encerrando"
        );

        options.level = ToastLevel::Warning;
        options.title = Some("Avaliação".to_string());
        assert_eq!(
            ConsoleToaster::render("Prazo amanhã", &options),
            "[warning] Avaliação: Prazo amanhã"
        );
    }

    #[tokio::test]
    async fn test_console_show_succeeds() {
        let toaster = ConsoleToaster::new();
        assert!(toaster.show("hello", &ToastOptions::default()).await.is_ok());
        assert_eq!(toaster.name(), "console");
    }
}
