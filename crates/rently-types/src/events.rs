use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The live nudge pushed to a connected recipient when someone messages
/// them. Ephemeral: it lives in the session's pending list until cleared
/// and is never persisted — the durable `Message` is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub from_user_id: i64,
    pub rental_id: Option<i64>,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

/// Events sent over the WebSocket stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LiveEvent {
    /// Server accepted the connection for this user
    Ready { user_id: i64 },

    /// A new message addressed to this user was persisted
    NewMessage(NotificationEvent),
}
