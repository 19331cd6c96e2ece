use async_trait::async_trait;

use crate::error::AppResult;
use crate::notifications::NotificationEvent;
use crate::session::Credential;

/// Opens authenticated push connections
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open one connection and complete the namespace handshake
    ///
    /// Returns `AppError::Unauthorized` when the server rejects the
    /// credential, other variants for transport failures.
    async fn connect(&self, credential: &Credential) -> AppResult<Box<dyn EventStream>>;

    /// Human-readable target for logs
    fn endpoint(&self) -> String;
}

/// Inbound side of an open connection
#[async_trait]
pub trait EventStream: Send {
    /// Next notification, in transport order
    ///
    /// `None` means the server closed the connection. An `Err` is a
    /// transport failure; the stream must not be polled after either.
    async fn next_event(&mut self) -> Option<AppResult<NotificationEvent>>;

    /// Close the connection from the client side
    async fn close(&mut self);
}
