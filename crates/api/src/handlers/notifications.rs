//! Notification inbox for admins and responders, plus admin-sent messages.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::notification::{validate_message, validate_recipient, SENDER_ADMIN};
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::DbId;
use mdrrmo_db::models::notification::{CreateNotification, Notification};
use mdrrmo_db::models::{clamp_limit, clamp_offset};
use mdrrmo_db::repositories::{AccountRepo, NotificationRepo};
use mdrrmo_db::retry::with_retry;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{Actor, AdminUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /api/notifications`.
#[derive(Debug, Default, Deserialize)]
pub struct InboxParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /api/notifications` and `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub account_type: AccountType,
    pub account_id: DbId,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// Name of the recipient, or 404 if the account does not exist.
pub(crate) async fn recipient_name(
    state: &AppState,
    account_type: AccountType,
    account_id: DbId,
) -> AppResult<String> {
    AccountRepo::name_of(&state.pool, account_type, account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Recipient",
            id: account_id,
        }))
}

/// GET /api/notifications
///
/// The caller's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Actor(account): Actor,
    Query(params): Query<InboxParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let items = with_retry(&state.retry, || {
        NotificationRepo::list_for_account(
            &state.pool,
            account.account_type.as_str(),
            account.id,
            params.unread_only,
            limit,
            offset,
        )
    })
    .await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Actor(account): Actor,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = with_retry(&state.retry, || {
        NotificationRepo::unread_count(&state.pool, account.account_type.as_str(), account.id)
    })
    .await?;
    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}

/// POST /api/notifications/{id}/read
///
/// 404 when the notification belongs to someone else.
pub async fn mark_read(
    State(state): State<AppState>,
    Actor(account): Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found =
        NotificationRepo::mark_read(&state.pool, id, account.account_type.as_str(), account.id)
            .await?;
    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Actor(account): Actor,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let updated =
        NotificationRepo::mark_all_read(&state.pool, account.account_type.as_str(), account.id)
            .await?;
    Ok(Json(DataResponse {
        data: MarkedRead { updated },
    }))
}

/// POST /api/notifications
///
/// An admin sends a message to any account.
pub async fn send_notification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Notification>>)> {
    validate_recipient(input.account_type)?;
    let message = validate_message(&input.message)?;
    let recipient = recipient_name(&state, input.account_type, input.account_id).await?;
    let sender_name = AccountRepo::name_of(&state.pool, AccountType::Admin, admin.id).await?;

    let notification = NotificationRepo::create(
        &state.pool,
        &CreateNotification {
            account_type: input.account_type.as_str().to_string(),
            account_id: input.account_id,
            sender_type: SENDER_ADMIN.to_string(),
            sender_id: Some(admin.id),
            sender_account_type: Some(AccountType::Admin.as_str().to_string()),
            sender_name,
            recipient_name: Some(recipient),
            message,
        },
    )
    .await?;

    tracing::info!(
        notification_id = notification.id,
        recipient_type = %input.account_type,
        recipient_id = input.account_id,
        admin_id = admin.id,
        "Notification sent",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: notification })))
}
