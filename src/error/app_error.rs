use thiserror::Error;

/// Application-wide error type for the notification client.
///
/// The channel itself never surfaces these to its owner; they are logged and
/// fed into the reconnection policy. Callers of the lower-level building
/// blocks (connectors, toasters, session store) receive them directly.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The server rejected the credential
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Transport-level failure while connecting or reading
    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// An operation did not complete within its deadline
    #[error("Timed out: {operation}")]
    Timeout { operation: String },

    /// The peer sent something the packet codec could not make sense of
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Toast surface failed to present a message
    #[error("Toast delivery failed via {surface}: {message}")]
    Toast { surface: String, message: String },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Whether the failure was an explicit credential rejection
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Unauthorized { .. })
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match error {
            WsError::Http(response) => match response.status().as_u16() {
                401 | 403 => AppError::unauthorized(format!(
                    "WebSocket upgrade rejected with HTTP {}",
                    response.status()
                )),
                code => AppError::connection(format!("WebSocket HTTP error: {}", code)),
            },
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                AppError::connection("WebSocket connection closed")
            }
            other => AppError::connection(other.to_string()),
        }
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        let key = error.field().unwrap_or("settings").to_string();
        AppError::Configuration {
            key,
            source: anyhow::Error::new(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ConfigError;

    #[test]
    fn test_auth_failure_detection() {
        assert!(AppError::unauthorized("bad token").is_auth_failure());
        assert!(!AppError::connection("refused").is_auth_failure());
        assert!(!AppError::Timeout {
            operation: "connect".to_string()
        }
        .is_auth_failure());
    }

    #[test]
    fn test_config_error_keeps_field_as_key() {
        let err: AppError = ConfigError::validation("channel.url", "must not be empty").into();
        match err {
            AppError::Configuration { key, .. } => assert_eq!(key, "channel.url"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_config_error_without_field_uses_settings_key() {
        let err: AppError = ConfigError::file_not_found("config/default.toml").into();
        match err {
            AppError::Configuration { key, .. } => assert_eq!(key, "settings"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_messages() {
        let err = AppError::Toast {
            surface: "webhook".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "Toast delivery failed via webhook: HTTP 500");
    }
}
