use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use jiff::Timestamp;

use super::event::NotificationEvent;

/// Application-visible notification state the channel appends to.
///
/// Implementations must be cheap to call from the channel task: `append`
/// is invoked inline for every inbound event.
pub trait NotificationStore: Send + Sync {
    /// Record a newly received notification. Events are presumed new; no
    /// deduplication against existing entries happens here.
    fn append(&self, event: NotificationEvent);
}

/// A notification as kept by the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNotification {
    pub event: NotificationEvent,
    pub received_at: Timestamp,
    pub read: bool,
}

/// Process-local notification list with read flags
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    entries: RwLock<Vec<StoredNotification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, oldest first
    pub fn list(&self) -> Vec<StoredNotification> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.read().iter().filter(|entry| !entry.read).count()
    }

    /// Mark every entry carrying `id` as read. Returns how many flipped.
    pub fn mark_as_read(&self, id: &str) -> usize {
        let mut entries = self.write();
        let mut changed = 0;
        for entry in entries.iter_mut().filter(|e| e.event.id == id && !e.read) {
            entry.read = true;
            changed += 1;
        }
        changed
    }

    /// Returns how many entries flipped from unread to read
    pub fn mark_all_as_read(&self) -> usize {
        let mut entries = self.write();
        let mut changed = 0;
        for entry in entries.iter_mut().filter(|e| !e.read) {
            entry.read = true;
            changed += 1;
        }
        changed
    }

    // Poisoning is ignored: entries are only ever pushed or flag-flipped.
    fn read(&self) -> RwLockReadGuard<'_, Vec<StoredNotification>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<StoredNotification>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn append(&self, event: NotificationEvent) {
        self.write().push(StoredNotification {
            event,
            received_at: Timestamp::now(),
            read: false,
        });
    }
}
