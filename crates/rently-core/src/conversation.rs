use rently_types::models::Message;

/// Canonical key for a conversation. Conversations are never stored as
/// rows of their own; they are derived from the fixed participant pair
/// plus the rental, or from the pair alone for the direct admin channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    Rental { rental_id: i64, low: i64, high: i64 },
    Direct { low: i64, high: i64 },
}

impl ConversationKey {
    pub fn new(a: i64, b: i64, rental_id: Option<i64>) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        match rental_id {
            Some(rental_id) => Self::Rental { rental_id, low, high },
            None => Self::Direct { low, high },
        }
    }

    pub fn of(message: &Message) -> Self {
        Self::new(message.sender_id, message.receiver_id, message.rental_id)
    }
}
