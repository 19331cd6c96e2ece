use std::sync::Arc;

use super::bus::EventBus;
use super::event::NotificationEvent;
use super::store::NotificationStore;
use super::toast::{ToastOptions, Toaster};

/// Forwards every inbound notification to the store, the toast surface and
/// the event bus, in that order.
///
/// Toast failures are logged and never stop the other two deliveries.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    toaster: Option<Arc<dyn Toaster>>,
    toast_options: ToastOptions,
    bus: EventBus,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self {
            store,
            toaster: None,
            toast_options: ToastOptions::default(),
            bus: EventBus::default(),
        }
    }

    pub fn with_toaster(mut self, toaster: Arc<dyn Toaster>, options: ToastOptions) -> Self {
        self.toaster = Some(toaster);
        self.toast_options = options;
        self
    }

    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub async fn dispatch(&self, event: NotificationEvent) {
        tracing::info!(
            notification_id = %event.id,
            "Notification received"
        );

        self.store.append(event.clone());

        if let Some(toaster) = &self.toaster {
            if let Err(e) = toaster.show(&event.message, &self.toast_options).await {
                tracing::warn!(
                    notification_id = %event.id,
                    surface = toaster.name(),
                    error = %e,
                    "Failed to show toast"
                );
            }
        }

        let reached = self.bus.publish(event);
        tracing::debug!(subscribers = reached, "Notification published on event bus");
    }
}
