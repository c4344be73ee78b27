use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rently_core::ChatError;
use rently_types::api::ErrorBody;
use tracing::error;

/// Wire mapping for the core's failure taxonomy. Store failures are
/// logged server-side and surface as 503 without internal detail.
pub struct ApiError(ChatError);

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// A blocking-task join failure; treated like a store outage.
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self(ChatError::Store(format!("blocking task failed: {err}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ChatError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            ChatError::UnknownParticipant(_) | ChatError::UnknownRental(_) => {
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            ChatError::UnauthorizedConversation => (StatusCode::FORBIDDEN, self.0.to_string()),
            ChatError::Store(detail) => {
                error!("store failure: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "message store unavailable".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
