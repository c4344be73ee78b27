use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rently_core::provider::LivePush;
use rently_types::events::{LiveEvent, NotificationEvent};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::notifications::NotificationLog;

/// One live session per connected user: at most one open channel per user
/// id, plus the session's pending notification list.
struct Session {
    conn_id: Uuid,
    tx: mpsc::UnboundedSender<LiveEvent>,
    pending: NotificationLog,
}

/// Registry of connected users. The session table is the only shared
/// mutable structure in the core; every register/deregister/publish goes
/// through its lock, so a publish racing a disconnect either delivers
/// before the channel closes or lands on a dropped sender and is
/// swallowed — never delivered after close.
#[derive(Clone, Default)]
pub struct Hub {
    sessions: Arc<RwLock<HashMap<i64, Session>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live channel for a user. A new connection under the
    /// same user id supersedes the old one: the prior sender is dropped
    /// here, which terminates the prior delivery loop.
    pub fn register(&self, user_id: i64) -> (Uuid, mpsc::UnboundedReceiver<LiveEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            conn_id,
            tx,
            pending: NotificationLog::default(),
        };
        if self
            .sessions
            .write()
            .expect("session lock poisoned")
            .insert(user_id, session)
            .is_some()
        {
            debug!(user_id, "existing live session superseded");
        }
        (conn_id, rx)
    }

    /// Deregister, but only if `conn_id` still owns the slot — a stale
    /// disconnect must never tear down a newer session. Idempotent.
    pub fn deregister(&self, user_id: i64, conn_id: Uuid) {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        if sessions.get(&user_id).is_some_and(|s| s.conn_id == conn_id) {
            sessions.remove(&user_id);
        }
    }

    pub fn connected(&self, user_id: i64) -> bool {
        self.sessions
            .read()
            .expect("session lock poisoned")
            .contains_key(&user_id)
    }

    /// Best-effort delivery: append to the session's pending list and
    /// push on the live channel if the user is connected, otherwise drop
    /// the event. The durable message already exists, so a dropped nudge
    /// is recovered by polling.
    pub fn publish(&self, receiver_id: i64, event: NotificationEvent) {
        let sessions = self.sessions.read().expect("session lock poisoned");
        let Some(session) = sessions.get(&receiver_id) else {
            debug!(receiver_id, "notification dropped, recipient offline");
            return;
        };
        session.pending.push(event.clone());
        let _ = session.tx.send(LiveEvent::NewMessage(event));
    }

    /// Pending notifications for a connected user; empty if offline.
    pub fn pending(&self, user_id: i64) -> Vec<NotificationEvent> {
        self.sessions
            .read()
            .expect("session lock poisoned")
            .get(&user_id)
            .map(|s| s.pending.snapshot())
            .unwrap_or_default()
    }

    /// No-op for disconnected users.
    pub fn clear_pending(&self, user_id: i64) {
        if let Some(session) = self
            .sessions
            .read()
            .expect("session lock poisoned")
            .get(&user_id)
        {
            session.pending.clear();
        }
    }
}

impl LivePush for Hub {
    fn publish(&self, receiver_id: i64, event: NotificationEvent) {
        Hub::publish(self, receiver_id, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::sync::mpsc::error::TryRecvError;

    fn event(from: i64, body: &str) -> NotificationEvent {
        NotificationEvent {
            from_user_id: from,
            rental_id: Some(5),
            body: body.to_string(),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_connected_user_and_pending_list() {
        let hub = Hub::new();
        let (_conn, mut rx) = hub.register(20);

        hub.publish(20, event(10, "Is this available?"));

        assert_eq!(hub.pending(20).len(), 1);
        match rx.try_recv().unwrap() {
            LiveEvent::NewMessage(ev) => {
                assert_eq!(ev.from_user_id, 10);
                assert_eq!(ev.body, "Is this available?");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_to_offline_user_is_dropped() {
        let hub = Hub::new();
        hub.publish(20, event(10, "anyone home?"));
        assert!(hub.pending(20).is_empty());

        // Connecting later starts with a clean slate.
        let (_conn, mut rx) = hub.register(20);
        assert!(hub.pending(20).is_empty());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn two_publishes_arrive_in_order() {
        let hub = Hub::new();
        let (_conn, mut rx) = hub.register(20);

        hub.publish(20, event(10, "first"));
        hub.publish(20, event(10, "second"));

        let bodies: Vec<String> = hub.pending(20).into_iter().map(|e| e.body).collect();
        assert_eq!(bodies, ["first", "second"]);

        let LiveEvent::NewMessage(a) = rx.try_recv().unwrap() else { panic!() };
        let LiveEvent::NewMessage(b) = rx.try_recv().unwrap() else { panic!() };
        assert_eq!(a.body, "first");
        assert_eq!(b.body, "second");
    }

    #[tokio::test]
    async fn reconnect_supersedes_the_stale_channel() {
        let hub = Hub::new();
        let (_c1, mut rx1) = hub.register(20);
        let (_c2, mut rx2) = hub.register(20);

        hub.publish(20, event(10, "after reconnect"));

        // The stale channel is closed and never sees the event.
        assert!(matches!(rx1.try_recv(), Err(TryRecvError::Disconnected)));
        assert!(matches!(rx2.try_recv(), Ok(LiveEvent::NewMessage(_))));
    }

    #[tokio::test]
    async fn stale_deregister_leaves_the_new_session_alone() {
        let hub = Hub::new();
        let (c1, _rx1) = hub.register(20);
        let (_c2, mut rx2) = hub.register(20);

        hub.deregister(20, c1);
        assert!(hub.connected(20));

        hub.publish(20, event(10, "still here"));
        assert!(matches!(rx2.try_recv(), Ok(LiveEvent::NewMessage(_))));
    }

    #[tokio::test]
    async fn deregister_is_idempotent() {
        let hub = Hub::new();
        let (conn, _rx) = hub.register(20);
        hub.deregister(20, conn);
        hub.deregister(20, conn);
        assert!(!hub.connected(20));
    }

    #[tokio::test]
    async fn clear_pending_empties_the_list() {
        let hub = Hub::new();
        let (_conn, _rx) = hub.register(20);
        hub.publish(20, event(10, "a"));
        hub.publish(20, event(10, "b"));

        hub.clear_pending(20);
        assert!(hub.pending(20).is_empty());

        // Clearing for an offline user is a no-op.
        hub.clear_pending(99);
    }
}
