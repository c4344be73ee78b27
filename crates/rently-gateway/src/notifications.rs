use std::sync::{Arc, Mutex};

use rently_types::events::NotificationEvent;

/// Ordered, append-only list of undelivered notification events for one
/// live session. Events pile up until the consumer clears them; an open
/// conversation view does not suppress appends. The list dies with the
/// session — durability belongs to the message store.
#[derive(Clone, Default)]
pub struct NotificationLog {
    inner: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl NotificationLog {
    pub fn push(&self, event: NotificationEvent) {
        self.inner.lock().expect("notification lock poisoned").push(event);
    }

    pub fn snapshot(&self) -> Vec<NotificationEvent> {
        self.inner.lock().expect("notification lock poisoned").clone()
    }

    /// Idempotent: clearing an already-empty list is fine.
    pub fn clear(&self) {
        self.inner.lock().expect("notification lock poisoned").clear();
    }
}
