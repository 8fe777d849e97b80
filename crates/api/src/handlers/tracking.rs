//! Responder tracking: location pings from the field app, the dispatcher's
//! live map, breadcrumb history and stale-session cleanup.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::security::event_types;
use mdrrmo_core::tracking::{active_cutoff, route_progress, LocationFix};
use mdrrmo_core::types::{DbId, Timestamp};
use mdrrmo_db::models::responder_session::{LocationPoint, ResponderSession, TrackingRow};
use mdrrmo_db::repositories::responder_session_repo::MAX_HISTORY_POINTS;
use mdrrmo_db::repositories::{AccountRepo, ResponderSessionRepo};
use mdrrmo_db::retry::with_retry;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit::{self, SecurityEvent};
use crate::background::session_cleanup::sweep_stale_sessions;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AdminUser, ResponderUser};
use crate::middleware::rbac::CronOrAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// One responder on the live map.
#[derive(Debug, Serialize)]
pub struct TrackingEntry {
    #[serde(flatten)]
    pub session: TrackingRow,
    /// Great-circle distance to the assigned alert, when both ends are known.
    pub distance_to_destination_m: Option<f64>,
    pub eta_seconds: Option<i64>,
}

impl From<TrackingRow> for TrackingEntry {
    fn from(session: TrackingRow) -> Self {
        let progress = route_progress(
            session.current_lat.zip(session.current_lng),
            session.destination_lat.zip(session.destination_lng),
            session.speed,
        );
        Self {
            distance_to_destination_m: progress.map(|p| p.distance_to_destination_m),
            eta_seconds: progress.and_then(|p| p.eta_seconds),
            session,
        }
    }
}

/// Query parameters for `GET /api/responders/{id}/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub since: Option<Timestamp>,
    pub limit: Option<i64>,
}

/// Response body for `POST /api/responders/sessions/cleanup`.
#[derive(Debug, Serialize)]
pub struct CleanupResult {
    pub deactivated: u64,
}

/// POST /api/responders/location
///
/// Validates the fix, then updates the session and appends a breadcrumb in
/// one transaction.
pub async fn update_location(
    State(state): State<AppState>,
    ResponderUser(responder): ResponderUser,
    Json(fix): Json<LocationFix>,
) -> AppResult<Json<DataResponse<ResponderSession>>> {
    let fix = fix.validated()?;
    let session = ResponderSessionRepo::record_location(&state.pool, responder.id, &fix).await?;

    tracing::debug!(
        responder_id = responder.id,
        lat = fix.lat,
        lng = fix.lng,
        "Location recorded",
    );
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/responders/heartbeat
///
/// Keeps the session live without a position. Opens a session if the
/// responder has none. Returns 204.
pub async fn heartbeat(
    State(state): State<AppState>,
    ResponderUser(responder): ResponderUser,
) -> AppResult<StatusCode> {
    if !ResponderSessionRepo::heartbeat(&state.pool, responder.id).await? {
        ResponderSessionRepo::open(&state.pool, responder.id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/responders/tracking
///
/// Live sessions with distance and ETA to each assigned alert. Polled by
/// the dashboard, so transient database failures are retried.
pub async fn list_tracking(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<DataResponse<Vec<TrackingEntry>>>> {
    let cutoff = active_cutoff(Utc::now(), state.config.session_active_window_secs);
    let rows = with_retry(&state.retry, || {
        ResponderSessionRepo::list_active(&state.pool, cutoff)
    })
    .await?;

    Ok(Json(DataResponse {
        data: rows.into_iter().map(TrackingEntry::from).collect(),
    }))
}

/// GET /api/responders/{id}/history
///
/// Breadcrumbs oldest first, at most 1000.
pub async fn location_history(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(responder_id): Path<DbId>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<LocationPoint>>>> {
    if !AccountRepo::exists(&state.pool, AccountType::Responder, responder_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Responder",
            id: responder_id,
        }));
    }

    let limit = params.limit.unwrap_or(MAX_HISTORY_POINTS);
    let points =
        ResponderSessionRepo::history(&state.pool, responder_id, params.since, limit).await?;
    Ok(Json(DataResponse { data: points }))
}

/// POST /api/responders/sessions/cleanup
///
/// Marks sessions past the activity window offline. Callable by an admin or
/// by an external scheduler presenting `x-cron-secret`.
pub async fn cleanup_sessions(
    State(state): State<AppState>,
    caller: CronOrAdmin,
    headers: HeaderMap,
) -> AppResult<Json<DataResponse<CleanupResult>>> {
    let deactivated =
        sweep_stale_sessions(&state.pool, state.config.session_active_window_secs).await?;

    let trigger = match &caller {
        CronOrAdmin::Cron => json!({ "trigger": "cron" }),
        CronOrAdmin::Admin(admin) => json!({ "trigger": "admin", "admin_id": admin.id }),
    };
    audit::record(
        &state.pool,
        Some(&headers),
        SecurityEvent {
            event_type: event_types::SESSION_CLEANUP,
            email: None,
            details: json!({ "deactivated": deactivated, "caller": trigger }),
        },
    )
    .await;

    Ok(Json(DataResponse {
        data: CleanupResult { deactivated },
    }))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row() -> TrackingRow {
        let ts = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        TrackingRow {
            session_id: 1,
            responder_id: 2,
            responder_name: "Team Alpha".into(),
            responder_contact: None,
            current_lat: Some(13.0),
            current_lng: Some(122.0),
            heading: Some(90.0),
            speed: Some(10.0),
            accuracy: None,
            status: "en_route".into(),
            last_active_at: ts,
            assigned_alert_id: Some(5),
            destination_lat: Some(13.0),
            destination_lng: Some(122.01),
            route_started_at: Some(ts),
            alert_type: Some("Fire".into()),
            alert_severity: Some("high".into()),
            alert_status: Some("Ongoing".into()),
            alert_address: None,
        }
    }

    #[test]
    fn entry_carries_route_progress() {
        let entry = TrackingEntry::from(row());
        let distance = entry.distance_to_destination_m.unwrap();
        assert!((distance - 1083.0).abs() < 5.0, "distance was {distance}");
        assert_eq!(entry.eta_seconds, Some((distance / 10.0).round() as i64));
    }

    #[test]
    fn no_progress_without_destination() {
        let entry = TrackingEntry::from(TrackingRow {
            destination_lat: None,
            destination_lng: None,
            ..row()
        });
        assert_eq!(entry.distance_to_destination_m, None);
        assert_eq!(entry.eta_seconds, None);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["responder_name"], "Team Alpha");
        assert!(json["distance_to_destination_m"].is_null());
    }
}
