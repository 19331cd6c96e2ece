//! review-notify library
//!
//! Client side of the review platform's real-time notification feed: a
//! Socket.IO channel with bounded reconnect backoff that forwards pushed
//! notifications to an in-process store, a toast surface and an event bus.

use shadow_rs::shadow;
shadow!(build);

pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod notifications;
pub mod runtime;
pub mod session;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
