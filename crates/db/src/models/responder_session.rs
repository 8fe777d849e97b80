//! Responder session and location-history models.

use mdrrmo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Latest known state of one responder (one row per responder).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResponderSession {
    pub id: DbId,
    pub responder_id: DbId,
    pub current_lat: Option<f64>,
    pub current_lng: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub assigned_alert_id: Option<DbId>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub route_started_at: Option<Timestamp>,
    pub status: String,
    pub is_active: bool,
    pub last_active_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A live session joined with its responder and assigned alert, as shown on
/// the tracking map.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrackingRow {
    pub session_id: DbId,
    pub responder_id: DbId,
    pub responder_name: String,
    pub responder_contact: Option<String>,
    pub current_lat: Option<f64>,
    pub current_lng: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub status: String,
    pub last_active_at: Timestamp,
    pub assigned_alert_id: Option<DbId>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub route_started_at: Option<Timestamp>,
    pub alert_type: Option<String>,
    pub alert_severity: Option<String>,
    pub alert_status: Option<String>,
    pub alert_address: Option<String>,
}

/// One breadcrumb from `responder_location_history`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationPoint {
    pub id: DbId,
    pub responder_id: DbId,
    pub session_id: DbId,
    pub lat: f64,
    pub lng: f64,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub recorded_at: Timestamp,
}
