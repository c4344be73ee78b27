use std::sync::Arc;

use rently_types::events::NotificationEvent;
use rently_types::models::{Message, Role, UserProfile};
use tracing::debug;

use crate::conversation::ConversationKey;
use crate::error::ChatError;
use crate::provider::{IdentityProvider, ListingDirectory, LivePush, MessageStore, NewMessage};

/// Sole write path into the message log. Validates the participant pair,
/// enforces the conversation rules, persists, then fires the live nudge.
pub struct ConversationResolver {
    identity: Arc<dyn IdentityProvider>,
    listings: Arc<dyn ListingDirectory>,
    store: Arc<dyn MessageStore>,
    push: Arc<dyn LivePush>,
}

impl ConversationResolver {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        listings: Arc<dyn ListingDirectory>,
        store: Arc<dyn MessageStore>,
        push: Arc<dyn LivePush>,
    ) -> Self {
        Self { identity, listings, store, push }
    }

    /// Validate, persist, and notify. Persist-then-push runs before this
    /// returns, so for a fixed sender/receiver pair notifications leave
    /// in the order messages were stored.
    pub fn send(
        &self,
        sender_id: i64,
        receiver_id: i64,
        rental_id: Option<i64>,
        body: &str,
    ) -> Result<Message, ChatError> {
        if body.trim().is_empty() {
            return Err(ChatError::Validation("message body must not be empty"));
        }

        let sender = self.require_user(sender_id)?;
        let receiver = self.require_user(receiver_id)?;

        if sender.suspended {
            return Err(ChatError::UnauthorizedConversation);
        }

        match rental_id {
            Some(rid) => {
                let rental = self
                    .listings
                    .get_rental(rid)?
                    .ok_or(ChatError::UnknownRental(rid))?;

                // Exactly one side is the landlord who owns the listing,
                // unless an admin is stepping in as either party.
                let owner_count = [sender_id, receiver_id]
                    .iter()
                    .filter(|&&id| id == rental.owner_id)
                    .count();
                let admin_involved =
                    sender.role == Role::Admin || receiver.role == Role::Admin;
                if owner_count != 1 && !admin_involved {
                    return Err(ChatError::UnauthorizedConversation);
                }
            }
            None => {
                // The direct channel is reserved for admin conversations.
                let admins = [&sender, &receiver]
                    .iter()
                    .filter(|u| u.role == Role::Admin)
                    .count();
                if admins != 1 {
                    return Err(ChatError::UnauthorizedConversation);
                }
            }
        }

        let stored = self.store.append(NewMessage {
            sender_id,
            receiver_id,
            rental_id,
            body: body.trim().to_string(),
        })?;

        debug!(
            message_id = stored.id,
            sender_id, receiver_id, rental_id, "message persisted"
        );

        self.push.publish(
            receiver_id,
            NotificationEvent {
                from_user_id: sender_id,
                rental_id,
                body: stored.body.clone(),
                received_at: stored.created_at,
            },
        );

        Ok(stored)
    }

    /// Read a conversation, oldest first.
    ///
    /// For a rental thread the owner and admins see everything; anyone
    /// else sees only messages they sent or received, which makes a
    /// client who never wrote into the thread get an empty list rather
    /// than a peek at the landlord's other conversations.
    pub fn read(
        &self,
        requester_id: i64,
        rental_id: Option<i64>,
        counterpart_id: Option<i64>,
    ) -> Result<Vec<Message>, ChatError> {
        let requester = self.require_user(requester_id)?;

        let mut messages = match rental_id {
            Some(rid) => {
                let rental = self
                    .listings
                    .get_rental(rid)?
                    .ok_or(ChatError::UnknownRental(rid))?;

                let privileged =
                    requester_id == rental.owner_id || requester.role == Role::Admin;
                let mut messages = self.store.query_by_rental(rid)?;
                match counterpart_id {
                    // Narrowing means the same thing for every caller:
                    // the thread between the requester and that user.
                    Some(cp) => {
                        let key = ConversationKey::new(requester_id, cp, Some(rid));
                        messages.retain(|m| ConversationKey::of(m) == key);
                    }
                    None if privileged => {}
                    None => {
                        messages.retain(|m| {
                            m.sender_id == requester_id || m.receiver_id == requester_id
                        });
                    }
                }
                messages
            }
            None => {
                let cp = counterpart_id.ok_or(ChatError::Validation(
                    "a direct conversation requires a counterpart",
                ))?;
                let counterpart = self.require_user(cp)?;

                let admins = [&requester, &counterpart]
                    .iter()
                    .filter(|u| u.role == Role::Admin)
                    .count();
                if admins != 1 {
                    return Err(ChatError::UnauthorizedConversation);
                }

                let key = ConversationKey::new(requester_id, cp, None);
                let mut messages = self.store.query_by_user(requester_id)?;
                messages.retain(|m| ConversationKey::of(m) == key);
                messages
            }
        };

        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    fn require_user(&self, id: i64) -> Result<UserProfile, ChatError> {
        self.identity
            .resolve_user(id)?
            .ok_or(ChatError::UnknownParticipant(id))
    }
}
