use thiserror::Error;

/// Failure taxonomy for the messaging core.
///
/// `Validation` means the caller can fix the input and retry.
/// `UnknownParticipant` / `UnknownRental` are not retriable. `Store` is a
/// collaborator failure; the core never retries an append on its own
/// because a blind retry without an idempotency key can duplicate the
/// message.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("unknown participant: user {0}")]
    UnknownParticipant(i64),

    #[error("unknown rental: {0}")]
    UnknownRental(i64),

    #[error("not authorized for this conversation")]
    UnauthorizedConversation,

    #[error("message store unavailable: {0}")]
    Store(String),
}
