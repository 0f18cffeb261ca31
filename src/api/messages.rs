//! Message endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::message::{CreateMessage, Message},
};

use super::{validate_body, AuthenticatedUser};

/// List messages sent or received by the caller
#[utoipa::path(
    get,
    path = "/messages",
    tag = "messages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Messages, newest first", body = Vec<Message>)
    )
)]
pub async fn list_messages(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Message>>> {
    let messages = state.services.messages.list_for_user(claims.user_id).await?;
    Ok(Json(messages))
}

/// Send a message
#[utoipa::path(
    post,
    path = "/messages",
    tag = "messages",
    security(("bearer_auth" = [])),
    request_body = CreateMessage,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn send_message(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<Message>)> {
    validate_body(&data)?;
    let message = state.services.messages.send(claims.user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Read a message, marking it read for the recipient
#[utoipa::path(
    get,
    path = "/messages/{id}",
    tag = "messages",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 403, description = "Not sender or recipient"),
        (status = 404, description = "Message not found")
    )
)]
pub async fn get_message(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Message>> {
    let message = state
        .services
        .messages
        .retrieve_and_mark_read(id, claims.user_id)
        .await?;
    Ok(Json(message))
}
