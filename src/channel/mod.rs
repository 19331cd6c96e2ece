//! Real-time notification channel.
//!
//! One persistent push connection per `NotificationChannel`, authenticated
//! with a bearer credential and re-established with bounded exponential
//! backoff. The wire side lives behind the `Connector` trait so the channel
//! logic runs the same against a Socket.IO server or an in-memory fake.

mod backoff;
mod notification_channel;
pub mod protocol;
mod state;
mod transport;
mod websocket;

pub use backoff::{GiveUpReason, ReconnectPolicy, RetryDecision};
pub use notification_channel::NotificationChannel;
pub use state::{ConnectionState, ConnectionStatus};
pub use transport::{Connector, EventStream};
pub use websocket::SocketIoConnector;
