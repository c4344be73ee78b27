use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rently_types::events::NotificationEvent;
use rently_types::models::{Message, RentalRecord, RentalStatus, Role, UserProfile};

use crate::error::ChatError;
use crate::provider::{IdentityProvider, ListingDirectory, LivePush, MessageStore, NewMessage};

pub const ADMIN: i64 = 1;
pub const CLIENT: i64 = 10;
pub const LANDLORD: i64 = 20;
pub const OTHER_CLIENT: i64 = 30;
pub const RENTAL: i64 = 5;

/// In-memory identity provider + listing directory.
pub struct FakeDirectory {
    users: Mutex<HashMap<i64, UserProfile>>,
    rentals: HashMap<i64, RentalRecord>,
}

impl FakeDirectory {
    pub fn suspend(&self, id: i64) {
        if let Some(u) = self.users.lock().unwrap().get_mut(&id) {
            u.suspended = true;
        }
    }
}

impl IdentityProvider for FakeDirectory {
    fn resolve_user(&self, id: i64) -> Result<Option<UserProfile>, ChatError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

impl ListingDirectory for FakeDirectory {
    fn get_rental(&self, id: i64) -> Result<Option<RentalRecord>, ChatError> {
        Ok(self.rentals.get(&id).cloned())
    }
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// In-memory append-only message log with creation-ordered ids.
#[derive(Default)]
pub struct MemStore {
    messages: Mutex<Vec<Message>>,
}

impl MemStore {
    /// Append with an explicit timestamp. The real store records
    /// second-resolution timestamps, so rapid sends share one value;
    /// this lets tests reproduce that.
    pub fn append_at(&self, msg: NewMessage, created_at: DateTime<Utc>) -> Message {
        let mut messages = self.messages.lock().unwrap();
        let id = messages.len() as i64 + 1;
        let stored = Message {
            id,
            sender_id: msg.sender_id,
            receiver_id: msg.receiver_id,
            rental_id: msg.rental_id,
            body: msg.body,
            created_at,
        };
        messages.push(stored.clone());
        stored
    }
}

impl MessageStore for MemStore {
    fn append(&self, msg: NewMessage) -> Result<Message, ChatError> {
        // One second per message keeps timestamps creation-ordered
        // without sleeping in tests.
        let next = self.messages.lock().unwrap().len() as i64 + 1;
        Ok(self.append_at(msg, epoch() + Duration::seconds(next)))
    }

    fn query_by_rental(&self, rental_id: i64) -> Result<Vec<Message>, ChatError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.rental_id == Some(rental_id))
            .cloned()
            .collect())
    }

    fn query_by_user(&self, user_id: i64) -> Result<Vec<Message>, ChatError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect())
    }
}

/// Records published events instead of delivering them.
#[derive(Default)]
pub struct RecordingPush {
    events: Mutex<Vec<(i64, NotificationEvent)>>,
}

impl RecordingPush {
    pub fn published(&self) -> Vec<(i64, NotificationEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl LivePush for RecordingPush {
    fn publish(&self, receiver_id: i64, event: NotificationEvent) {
        self.events.lock().unwrap().push((receiver_id, event));
    }
}

pub struct Fixture {
    pub directory: Arc<FakeDirectory>,
    pub store: Arc<MemStore>,
    pub push: Arc<RecordingPush>,
}

impl Fixture {
    pub fn new() -> Self {
        let user = |id, role, name: &str| UserProfile {
            id,
            role,
            approved: true,
            suspended: false,
            display_name: name.to_string(),
            email: format!("{}@example.test", name.to_lowercase()),
        };

        let users = HashMap::from([
            (ADMIN, user(ADMIN, Role::Admin, "Admin")),
            (CLIENT, user(CLIENT, Role::Client, "Carol")),
            (LANDLORD, user(LANDLORD, Role::Landlord, "Lou")),
            (OTHER_CLIENT, user(OTHER_CLIENT, Role::Client, "Omar")),
        ]);
        let rentals = HashMap::from([(
            RENTAL,
            RentalRecord {
                id: RENTAL,
                owner_id: LANDLORD,
                status: RentalStatus::Available,
            },
        )]);

        Self {
            directory: Arc::new(FakeDirectory { users: Mutex::new(users), rentals }),
            store: Arc::new(MemStore::default()),
            push: Arc::new(RecordingPush::default()),
        }
    }
}
