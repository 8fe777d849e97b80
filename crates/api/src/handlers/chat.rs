//! One-to-one chat between accounts, stored as notifications with
//! `sender_type = 'chat'`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mdrrmo_core::notification::{validate_message, validate_recipient, SENDER_CHAT};
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::DbId;
use mdrrmo_db::models::clamp_limit;
use mdrrmo_db::models::notification::{CreateNotification, Notification};
use mdrrmo_db::repositories::{AccountRepo, NotificationRepo};
use serde::Deserialize;

use super::notifications::{recipient_name, SendMessageRequest};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ThreadParams {
    pub limit: Option<i64>,
}

/// POST /api/chat
pub async fn send_message(
    State(state): State<AppState>,
    Actor(sender): Actor,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Notification>>)> {
    if input.account_type == sender.account_type && input.account_id == sender.id {
        return Err(AppError::BadRequest("You cannot message yourself".into()));
    }
    validate_recipient(input.account_type)?;
    let message = validate_message(&input.message)?;
    let recipient = recipient_name(&state, input.account_type, input.account_id).await?;
    let sender_name = AccountRepo::name_of(&state.pool, sender.account_type, sender.id).await?;

    let sent = NotificationRepo::create(
        &state.pool,
        &CreateNotification {
            account_type: input.account_type.as_str().to_string(),
            account_id: input.account_id,
            sender_type: SENDER_CHAT.to_string(),
            sender_id: Some(sender.id),
            sender_account_type: Some(sender.account_type.as_str().to_string()),
            sender_name,
            recipient_name: Some(recipient),
            message,
        },
    )
    .await?;

    tracing::debug!(
        message_id = sent.id,
        from_type = %sender.account_type,
        from_id = sender.id,
        to_type = %input.account_type,
        to_id = input.account_id,
        "Chat message sent",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: sent })))
}

/// GET /api/chat/{account_type}/{account_id}
///
/// Messages between the caller and the counterpart, oldest first.
pub async fn thread(
    State(state): State<AppState>,
    Actor(caller): Actor,
    Path((other_type, other_id)): Path<(String, DbId)>,
    Query(params): Query<ThreadParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let other_type = other_type.parse::<AccountType>()?;
    let messages = NotificationRepo::chat_thread(
        &state.pool,
        (caller.account_type.as_str(), caller.id),
        (other_type.as_str(), other_id),
        clamp_limit(params.limit),
    )
    .await?;
    Ok(Json(DataResponse { data: messages }))
}
