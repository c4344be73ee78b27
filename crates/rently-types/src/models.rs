use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Landlord,
    Admin,
}

/// Account data owned by the identity provider. The messaging core only
/// ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub role: Role,
    pub approved: bool,
    pub suspended: bool,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Available,
    Booked,
}

/// Listing record owned by the listing directory; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRecord {
    pub id: i64,
    pub owner_id: i64,
    pub status: RentalStatus,
}

/// A stored chat message. `rental_id = None` marks a direct admin-channel
/// message. Ids are assigned by the store in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub rental_id: Option<i64>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// One inbox row: the latest message exchanged with a counterpart on a
/// given rental (or on the direct admin channel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub counterpart_id: i64,
    pub counterpart_name: String,
    pub counterpart_email: String,
    pub rental_id: Option<i64>,
    pub last_message: Message,
    pub involves_admin: bool,
}
