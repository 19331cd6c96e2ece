//! Webhook toast surface.
//!
//! Forwards each toast as a JSON POST using the global HTTP_CLIENT, for
//! setups where a separate desktop bridge renders the popup.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::toast::{ToastOptions, Toaster};
use crate::config::WebhookToastConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;

/// Webhook toast surface
///
/// # Example
/// ```ignore
/// let config = WebhookToastConfig {
///     url: "https://bridge.local/toast".to_string(),
///     timeout_seconds: 5,
///     headers: HashMap::new(),
/// };
/// let toaster = WebhookToaster::new(config);
/// toaster.show("Nova avaliação disponível", &ToastOptions::default()).await?;
/// ```
pub struct WebhookToaster {
    config: WebhookToastConfig,
}

impl WebhookToaster {
    pub fn new(config: WebhookToastConfig) -> Self {
        Self { config }
    }

    /// Request body sent for one toast
    pub(crate) fn payload(message: &str, options: &ToastOptions) -> Value {
        json!({
            "title": options.title,
            "message": message,
            "level": options.level.as_str(),
            "duration_ms": options.duration.as_millis() as u64,
        })
    }

    fn failure(&self, message: impl Into<String>) -> AppError {
        AppError::Toast {
            surface: self.name().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Toaster for WebhookToaster {
    async fn show(&self, message: &str, options: &ToastOptions) -> AppResult<()> {
        let mut request = HTTP_CLIENT
            .post(&self.config.url)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .json(&Self::payload(message, options));

        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.failure(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
