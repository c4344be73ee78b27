//! Trait implementations wiring the SQLite database into the core's
//! collaborator seams. All failures surface as `ChatError::Store`; the
//! core decides what is retriable.

use rently_core::ChatError;
use rently_core::provider::{IdentityProvider, ListingDirectory, MessageStore, NewMessage};
use rently_types::models::{Message, RentalRecord, UserProfile};

use crate::Database;

fn store_err(e: anyhow::Error) -> ChatError {
    ChatError::Store(e.to_string())
}

impl IdentityProvider for Database {
    fn resolve_user(&self, id: i64) -> Result<Option<UserProfile>, ChatError> {
        self.get_user(id)
            .map_err(store_err)?
            .map(|row| row.into_profile().map_err(store_err))
            .transpose()
    }
}

impl ListingDirectory for Database {
    fn get_rental(&self, id: i64) -> Result<Option<RentalRecord>, ChatError> {
        Database::get_rental(self, id)
            .map_err(store_err)?
            .map(|row| row.into_record().map_err(store_err))
            .transpose()
    }
}

impl MessageStore for Database {
    fn append(&self, msg: NewMessage) -> Result<Message, ChatError> {
        self.insert_message(msg.sender_id, msg.receiver_id, msg.rental_id, &msg.body)
            .map(|row| row.into_message())
            .map_err(store_err)
    }

    fn query_by_rental(&self, rental_id: i64) -> Result<Vec<Message>, ChatError> {
        Ok(self
            .messages_by_rental(rental_id)
            .map_err(store_err)?
            .into_iter()
            .map(|row| row.into_message())
            .collect())
    }

    fn query_by_user(&self, user_id: i64) -> Result<Vec<Message>, ChatError> {
        Ok(self
            .messages_by_user(user_id)
            .map_err(store_err)?
            .into_iter()
            .map(|row| row.into_message())
            .collect())
    }
}
