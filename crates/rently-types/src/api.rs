use serde::{Deserialize, Serialize};

use crate::models::Role;

// -- JWT Claims --

/// Claims carried in the bearer credential issued by the identity
/// provider. Shared by rently-api (REST middleware) and rently-gateway
/// (WebSocket upgrade) so there is a single canonical definition. The
/// token is always signature-verified before these are trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

// -- Chat --

/// Body of `POST /api/chat/send`. The sender is taken from the verified
/// claims, never from the request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    #[serde(default)]
    pub rental_id: Option<i64>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    #[serde(default)]
    pub counterpart_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
