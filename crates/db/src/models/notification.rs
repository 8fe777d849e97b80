//! Notification (and chat message) models.

use mdrrmo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `notifications`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub account_type: String,
    pub account_id: DbId,
    pub sender_type: String,
    pub sender_id: Option<DbId>,
    pub sender_account_type: Option<String>,
    pub sender_name: Option<String>,
    pub recipient_name: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub account_type: String,
    pub account_id: DbId,
    pub sender_type: String,
    pub sender_id: Option<DbId>,
    pub sender_account_type: Option<String>,
    pub sender_name: Option<String>,
    pub recipient_name: Option<String>,
    pub message: String,
}
