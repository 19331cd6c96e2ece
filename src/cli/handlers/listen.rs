//! Listen command handler
//!
//! Runs the listen command's dry-run validation, or tells main.rs to start
//! the live listener.

use crate::channel::SocketIoConnector;
use crate::cli::executor::CommandOutcome;
use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::session::{CredentialSource, SessionStore};

/// Handler for the listen command
pub struct ListenCommandHandler {
    config: Settings,
}

impl ListenCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the listen command with optional dry-run support
    ///
    /// A dry run validates and finishes. Otherwise the listener still has to
    /// be started by the caller, which owns the runtime and signal handling.
    pub async fn execute(&self, dry_run: bool) -> AppResult<CommandOutcome> {
        if dry_run {
            self.validate_only().await?;
            Ok(CommandOutcome::Done)
        } else {
            Ok(CommandOutcome::Listen)
        }
    }

    /// Validate configuration and the session without connecting
    async fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid");

        let connector = SocketIoConnector::from_config(&self.config.channel)?;
        println!("✓ Channel endpoint: {}", connector.endpoint_url());

        let policy = self.config.reconnect.to_policy();
        println!(
            "✓ Reconnect policy: {} retries, {:?} to {:?}",
            policy.max_reconnects(),
            policy.delay_for(0),
            policy.delay_for(policy.max_reconnects().saturating_sub(1)),
        );

        match SessionStore::from_config(&self.config.session).load()? {
            Some(_) => println!("✓ Session credential found"),
            None => println!("! No session credential: the listener would stay disconnected"),
        }

        if self.config.toast.enabled {
            self.config.toast.to_options()?;
            println!("✓ Toast surface: {:?}", self.config.toast.surface);
        } else {
            println!("✓ Toasts disabled");
        }

        println!("Dry run completed successfully - configuration is ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listen_handler_dry_run() {
        let handler = ListenCommandHandler::new(Settings::default());
        assert_eq!(handler.execute(true).await.unwrap(), CommandOutcome::Done);
    }

    #[tokio::test]
    async fn test_listen_handler_dry_run_invalid_config() {
        let mut config = Settings::default();
        config.channel.namespace = "notifications".to_string();
        let handler = ListenCommandHandler::new(config);

        assert!(handler.execute(true).await.is_err());
    }

    #[tokio::test]
    async fn test_listen_handler_without_dry_run_starts_listener() {
        let handler = ListenCommandHandler::new(Settings::default());
        assert_eq!(handler.execute(false).await.unwrap(), CommandOutcome::Listen);
    }
}
