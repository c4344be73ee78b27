use std::collections::HashSet;
use std::sync::Arc;

use rently_types::models::{ConversationSummary, Role};

use crate::error::ChatError;
use crate::provider::{IdentityProvider, MessageStore};

/// Reduces a user's flat message log into one row per counterpart and
/// rental, newest first, for the dashboard "recent messages" views.
pub struct InboxAggregator {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn MessageStore>,
}

impl InboxAggregator {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn MessageStore>) -> Self {
        Self { identity, store }
    }

    /// One summary per distinct (counterpart, rental) pair the user has
    /// participated in. The latest message wins; ties on timestamp fall
    /// back to the creation-ordered id. A brand-new user gets an empty
    /// list, not an error.
    pub fn recent(&self, user_id: i64) -> Result<Vec<ConversationSummary>, ChatError> {
        let mut messages = self.store.query_by_user(user_id)?;
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        messages.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let requester_is_admin = self
            .identity
            .resolve_user(user_id)?
            .is_some_and(|u| u.role == Role::Admin);

        let mut seen: HashSet<(i64, Option<i64>)> = HashSet::new();
        let mut summaries = Vec::new();

        for message in messages {
            let counterpart_id = if message.sender_id == user_id {
                message.receiver_id
            } else {
                message.sender_id
            };
            if !seen.insert((counterpart_id, message.rental_id)) {
                continue;
            }

            // Counterparts can disappear from the identity provider;
            // keep the row with a placeholder rather than dropping it.
            let counterpart = self.identity.resolve_user(counterpart_id)?;
            let (name, email, counterpart_is_admin) = match counterpart {
                Some(u) => (u.display_name, u.email, u.role == Role::Admin),
                None => ("unknown".to_string(), String::new(), false),
            };

            summaries.push(ConversationSummary {
                counterpart_id,
                counterpart_name: name,
                counterpart_email: email,
                rental_id: message.rental_id,
                last_message: message,
                involves_admin: requester_is_admin || counterpart_is_admin,
            });
        }

        Ok(summaries)
    }
}
