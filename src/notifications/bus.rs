//! In-process broadcast of received notifications.
//!
//! Other components subscribe here instead of polling the store.

use tokio::sync::broadcast;

use super::event::NotificationEvent;

/// Default number of events a slow subscriber may lag behind
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Named in-process event carrying each notification payload
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<NotificationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to every current subscriber
    ///
    /// Returns the number of subscribers reached. Publishing with no
    /// subscribers is not an error.
    pub fn publish(&self, event: NotificationEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(NotificationEvent::new("1", "a")), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_event() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(NotificationEvent::new("n1", "hello")), 2);

        assert_eq!(first.recv().await.unwrap().id, "n1");
        assert_eq!(second.recv().await.unwrap().message, "hello");
    }
}
