//! Listener runtime
//!
//! Wires settings into a running notification channel and keeps it alive
//! until a shutdown signal arrives or the channel gives up.

use std::sync::Arc;

use tokio::signal;

use crate::channel::{Connector, NotificationChannel, SocketIoConnector};
use crate::config::{Settings, ToastSurfaceKind};
use crate::error::AppResult;
use crate::notifications::{
    ConsoleToaster, InMemoryNotificationStore, NotificationDispatcher, Toaster, WebhookToaster,
};
use crate::session::{CredentialSource, SessionStore};

/// Long-running notification listener
pub struct Listener {
    settings: Settings,
}

impl Listener {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Build the channel and the store it appends to
    ///
    /// # Errors
    /// - Invalid channel URL
    /// - Unreadable session file
    /// - Invalid toast options
    pub fn build_channel(&self) -> AppResult<(NotificationChannel, Arc<InMemoryNotificationStore>)> {
        let connector: Arc<dyn Connector> =
            Arc::new(SocketIoConnector::from_config(&self.settings.channel)?);
        self.build_channel_with(connector)
    }

    /// Same as [`Listener::build_channel`] with a caller-supplied connector
    pub fn build_channel_with(
        &self,
        connector: Arc<dyn Connector>,
    ) -> AppResult<(NotificationChannel, Arc<InMemoryNotificationStore>)> {
        let credential = SessionStore::from_config(&self.settings.session).load()?;

        let store = Arc::new(InMemoryNotificationStore::new());
        let mut dispatcher = NotificationDispatcher::new(store.clone());
        if self.settings.toast.enabled {
            let toaster: Arc<dyn Toaster> = match self.settings.toast.surface {
                ToastSurfaceKind::Console => Arc::new(ConsoleToaster::new()),
                ToastSurfaceKind::Webhook => {
                    Arc::new(WebhookToaster::new(self.settings.toast.webhook.clone()))
                }
            };
            dispatcher = dispatcher.with_toaster(toaster, self.settings.toast.to_options()?);
        }

        let channel = NotificationChannel::new(connector, Arc::new(dispatcher), credential)
            .with_policy(self.settings.reconnect.to_policy())
            .with_connect_timeout(self.settings.channel.connect_timeout());

        Ok((channel, store))
    }

    /// Run until shutdown signal or until the channel stops for good
    ///
    /// A missing credential is not an error: the listener logs a warning and
    /// returns without connecting.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.settings.environment,
            "Application starting"
        );

        tracing::info!(
            url = %self.settings.channel.url,
            namespace = %self.settings.channel.namespace,
            event = %self.settings.channel.event,
            connect_timeout = %self.settings.channel.connect_timeout,
            "Channel configuration loaded"
        );

        tracing::info!(
            max_reconnects = %self.settings.reconnect.max_reconnects,
            base_delay_ms = %self.settings.reconnect.base_delay_ms,
            max_delay_ms = %self.settings.reconnect.max_delay_ms,
            retry_on_auth_failure = %self.settings.reconnect.retry_on_auth_failure,
            "Reconnect configuration loaded"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = %self.settings.logger.console.enabled,
            file_enabled = %self.settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        let (channel, store) = self.build_channel().map_err(|e| {
            tracing::error!(error = %e, "Failed to build notification channel");
            anyhow::anyhow!("Failed to build notification channel: {}", e)
        })?;

        if !channel.connect() {
            tracing::warn!("No session credential available; not connecting");
            return Ok(());
        }

        tokio::select! {
            _ = shutdown_signal() => {}
            _ = channel.stopped() => {
                tracing::warn!(
                    attempts = channel.reconnect_attempts(),
                    "Notification channel stopped reconnecting"
                );
            }
        }

        channel.teardown().await;

        tracing::info!(
            received = store.len(),
            unread = store.unread_count(),
            "Listener shutdown complete"
        );

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
