//! Notification delivery inside the application.
//!
//! Everything the channel hands an inbound notification to lives here: the
//! notification store, toast surfaces and the in-process event bus. The
//! `NotificationDispatcher` ties them together so the channel only sees one
//! collaborator.

mod bus;
mod dispatcher;
mod event;
mod store;
mod toast;
mod webhook_toast;

pub use bus::EventBus;
pub use dispatcher::NotificationDispatcher;
pub use event::NotificationEvent;
pub use store::{InMemoryNotificationStore, NotificationStore, StoredNotification};
pub use toast::{ConsoleToaster, ToastLevel, ToastOptions, Toaster};
pub use webhook_toast::WebhookToaster;
