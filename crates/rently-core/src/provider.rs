use rently_types::events::NotificationEvent;
use rently_types::models::{Message, RentalRecord, UserProfile};

use crate::error::ChatError;

/// A message accepted for persistence but not yet stored. The store
/// assigns the id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub rental_id: Option<i64>,
    pub body: String,
}

/// User lookup, owned by the identity provider. The core treats profiles
/// as read-only reference data and trusts that the caller's identity was
/// already verified upstream.
pub trait IdentityProvider: Send + Sync {
    fn resolve_user(&self, id: i64) -> Result<Option<UserProfile>, ChatError>;
}

/// Rental lookup, owned by the listing directory.
pub trait ListingDirectory: Send + Sync {
    fn get_rental(&self, id: i64) -> Result<Option<RentalRecord>, ChatError>;
}

/// Durable, append-only message log. `append` is the only mutation the
/// core is allowed; there is no update or delete.
pub trait MessageStore: Send + Sync {
    fn append(&self, msg: NewMessage) -> Result<Message, ChatError>;
    fn query_by_rental(&self, rental_id: i64) -> Result<Vec<Message>, ChatError>;
    fn query_by_user(&self, user_id: i64) -> Result<Vec<Message>, ChatError>;
}

/// Best-effort live notification sink. Implementations must swallow
/// delivery failures: the durable store already holds the message, so a
/// missed nudge is recovered by polling.
pub trait LivePush: Send + Sync {
    fn publish(&self, receiver_id: i64, event: NotificationEvent);
}
