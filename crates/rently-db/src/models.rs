//! Database row types — these map directly to SQLite rows. Kept distinct
//! from the rently-types API models so the DB layer stays independent.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rently_types::models::{Message, RentalRecord, RentalStatus, Role, UserProfile};
use tracing::warn;

pub struct UserRow {
    pub id: i64,
    pub role: String,
    pub approved: bool,
    pub suspended: bool,
    pub display_name: String,
    pub email: String,
}

pub struct RentalRow {
    pub id: i64,
    pub owner_id: i64,
    pub status: String,
}

pub struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub rental_id: Option<i64>,
    pub body: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_profile(self) -> Result<UserProfile> {
        let role = match self.role.as_str() {
            "client" => Role::Client,
            "landlord" => Role::Landlord,
            "admin" => Role::Admin,
            other => return Err(anyhow!("unknown role '{}' for user {}", other, self.id)),
        };
        Ok(UserProfile {
            id: self.id,
            role,
            approved: self.approved,
            suspended: self.suspended,
            display_name: self.display_name,
            email: self.email,
        })
    }
}

impl RentalRow {
    pub fn into_record(self) -> Result<RentalRecord> {
        let status = match self.status.as_str() {
            "available" => RentalStatus::Available,
            "booked" => RentalStatus::Booked,
            other => return Err(anyhow!("unknown status '{}' for rental {}", other, self.id)),
        };
        Ok(RentalRecord {
            id: self.id,
            owner_id: self.owner_id,
            status,
        })
    }
}

impl MessageRow {
    pub fn into_message(self) -> Message {
        let created_at = parse_timestamp(&self.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on message {}", self.created_at, self.id);
            DateTime::default()
        });
        Message {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            rental_id: self.rental_id,
            body: self.body,
            created_at,
        }
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Try RFC 3339 first, then parse as naive UTC and convert.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .map(|ndt| ndt.and_utc())
            .ok()
    })
}
