use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rently_core::ChatError;
use rently_types::api::{Claims, ConversationQuery, SendMessageRequest};
use rently_types::models::Role;

use crate::AppState;
use crate::error::ApiError;

/// Send a message. The sender is always the authenticated user; the body
/// cannot speak for anyone else.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Run blocking DB work off the async runtime
    let message = tokio::task::spawn_blocking(move || {
        state
            .resolver
            .send(claims.sub, req.receiver_id, req.rental_id, &req.body)
    })
    .await
    .map_err(ApiError::join)??;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Messages for a rental thread, oldest first. Owners and admins may
/// narrow to a single counterpart with `?counterpart_id=`.
pub async fn list_rental_conversation(
    State(state): State<AppState>,
    Path(rental_id): Path<i64>,
    Query(query): Query<ConversationQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = tokio::task::spawn_blocking(move || {
        state
            .resolver
            .read(claims.sub, Some(rental_id), query.counterpart_id)
    })
    .await
    .map_err(ApiError::join)??;

    Ok(Json(messages))
}

/// The direct admin-channel thread with one counterpart.
pub async fn list_direct_conversation(
    State(state): State<AppState>,
    Path(counterpart_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = tokio::task::spawn_blocking(move || {
        state.resolver.read(claims.sub, None, Some(counterpart_id))
    })
    .await
    .map_err(ApiError::join)??;

    Ok(Json(messages))
}

/// Recent-messages summary for a dashboard. A user may only read their
/// own inbox; admins may read anyone's.
pub async fn recent_inbox(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != user_id && claims.role != Role::Admin {
        return Err(ChatError::UnauthorizedConversation.into());
    }

    let summaries = tokio::task::spawn_blocking(move || state.inbox.recent(user_id))
        .await
        .map_err(ApiError::join)??;

    Ok(Json(summaries))
}

/// Pending live notifications for the authenticated user. Empty when the
/// user has no live session.
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    Json(state.hub.pending(claims.sub))
}

pub async fn clear_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    state.hub.clear_pending(claims.sub);
    StatusCode::NO_CONTENT
}
