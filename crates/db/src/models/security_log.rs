//! Security log models.
//!
//! Security logs have no `updated_at` field (immutable records).

use mdrrmo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A single security log entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SecurityLog {
    pub id: DbId,
    pub event_type: String,
    pub email: Option<String>,
    pub ip_address: Option<String>,
    pub severity: String,
    pub details: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for inserting a security log entry.
#[derive(Debug, Clone)]
pub struct CreateSecurityLog {
    pub event_type: String,
    pub email: Option<String>,
    pub ip_address: Option<String>,
    pub severity: String,
    pub details: Option<serde_json::Value>,
}

/// Filter parameters for querying security logs.
#[derive(Debug, Clone, Default)]
pub struct SecurityLogQuery {
    pub event_type: Option<String>,
    pub severity: Option<String>,
    /// Case-insensitive substring match.
    pub email: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated security log listing.
#[derive(Debug, Serialize)]
pub struct SecurityLogPage {
    pub items: Vec<SecurityLog>,
    pub total: i64,
}
