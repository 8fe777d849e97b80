//! Alert entity model and DTOs.

use mdrrmo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub status: String,
    pub severity: String,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub occurred_at: Timestamp,
    pub responded_at: Option<Timestamp>,
    pub user_id: Option<DbId>,
    pub responder_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an alert.
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub alert_type: String,
    pub severity: String,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub user_id: Option<DbId>,
}

/// Filter parameters for alert listings and exports.
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub alert_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated alert listing.
#[derive(Debug, Serialize)]
pub struct AlertPage {
    pub items: Vec<Alert>,
    pub total: i64,
}

/// Number of alerts currently in one status.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AlertStatusCount {
    pub status: String,
    pub count: i64,
}
