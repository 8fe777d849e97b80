//! Alert handlers: dispatcher views, status workflow, resident reports and
//! the responder's assignment.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mdrrmo_core::alert::{validate_alert_type, AlertStatus, Severity, DEFAULT_SEVERITY};
use mdrrmo_core::csv::CsvBuilder;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::notification::SENDER_SYSTEM;
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::{DbId, Timestamp};
use mdrrmo_core::validation::{optional_text, validate_coordinates};
use mdrrmo_db::models::alert::{Alert, AlertPage, AlertQuery, CreateAlert};
use mdrrmo_db::models::notification::CreateNotification;
use mdrrmo_db::repositories::{AccountRepo, AlertRepo, AssignOutcome, NotificationRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AdminUser, ResidentUser, ResponderUser};
use crate::response::{CsvDownload, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/alerts` and `GET /api/alerts/export`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    pub status: Option<String>,
    pub severity: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AlertListParams {
    /// Normalise the filters into the stored vocabulary.
    pub fn into_query(self) -> AppResult<AlertQuery> {
        let status = optional_text(self.status.as_deref())
            .map(|s| s.parse::<AlertStatus>().map(|s| s.as_str().to_string()))
            .transpose()?;
        let severity = optional_text(self.severity.as_deref())
            .map(|s| s.parse::<Severity>().map(|s| s.as_str().to_string()))
            .transpose()?;
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
            }
        }

        Ok(AlertQuery {
            status,
            severity,
            alert_type: optional_text(self.alert_type.as_deref()),
            from: self.from,
            to: self.to,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// Request body for `PUT /api/alerts/{id}/severity`.
#[derive(Debug, Deserialize)]
pub struct SeverityRequest {
    pub severity: String,
}

/// Request body for `PUT /api/alerts/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Request body for `POST /api/alerts/{id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub responder_id: DbId,
}

/// Request body for `POST /api/alerts` (resident report).
#[derive(Debug, Deserialize)]
pub struct ReportAlertRequest {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub lat: f64,
    pub lng: f64,
    pub severity: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Validate a resident report into the insert DTO.
pub fn validate_report(user_id: DbId, input: &ReportAlertRequest) -> AppResult<CreateAlert> {
    validate_coordinates(input.lat, input.lng)?;
    let severity = match optional_text(input.severity.as_deref()) {
        Some(s) => s.parse::<Severity>()?,
        None => DEFAULT_SEVERITY,
    };

    Ok(CreateAlert {
        alert_type: validate_alert_type(&input.alert_type)?,
        severity: severity.as_str().to_string(),
        lat: input.lat,
        lng: input.lng,
        address: optional_text(input.address.as_deref()),
        description: optional_text(input.description.as_deref()),
        image_url: optional_text(input.image_url.as_deref()),
        user_id: Some(user_id),
    })
}

/// CSV header for alert exports.
const EXPORT_COLUMNS: &[&str] = &[
    "id",
    "type",
    "status",
    "severity",
    "lat",
    "lng",
    "address",
    "description",
    "occurred_at",
    "responded_at",
    "user_id",
    "responder_id",
];

/// Render alerts as CSV, one row per alert in the given order.
pub fn alerts_csv(alerts: &[Alert]) -> String {
    let opt = |v: Option<DbId>| v.map(|v| v.to_string()).unwrap_or_default();
    let mut csv = CsvBuilder::with_header(EXPORT_COLUMNS);
    for a in alerts {
        csv.push_row([
            a.id.to_string(),
            a.alert_type.clone(),
            a.status.clone(),
            a.severity.clone(),
            a.lat.to_string(),
            a.lng.to_string(),
            a.address.clone().unwrap_or_default(),
            a.description.clone().unwrap_or_default(),
            a.occurred_at.to_rfc3339(),
            a.responded_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            opt(a.user_id),
            opt(a.responder_id),
        ]);
    }
    csv.finish()
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Alert", id })
}

fn changed_concurrently(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Alert {id} was changed by someone else; reload and try again"
    )))
}

async fn load(state: &AppState, id: DbId) -> AppResult<(Alert, AlertStatus)> {
    let alert = AlertRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let status = alert.status.parse::<AlertStatus>()?;
    Ok((alert, status))
}

// ---------------------------------------------------------------------------
// Dispatcher handlers
// ---------------------------------------------------------------------------

/// GET /api/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<AlertListParams>,
) -> AppResult<Json<DataResponse<AlertPage>>> {
    let query = params.into_query()?;
    let (items, total) = tokio::try_join!(
        AlertRepo::query(&state.pool, &query),
        AlertRepo::count(&state.pool, &query),
    )?;
    Ok(Json(DataResponse {
        data: AlertPage { items, total },
    }))
}

/// GET /api/alerts/{id}
pub async fn get_alert(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let (alert, _) = load(&state, id).await?;
    Ok(Json(DataResponse { data: alert }))
}

/// GET /api/alerts/export
///
/// CSV of every alert matching the filters, oldest first.
pub async fn export_alerts(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(params): Query<AlertListParams>,
) -> AppResult<CsvDownload> {
    let query = params.into_query()?;
    let alerts = AlertRepo::export(&state.pool, &query).await?;
    tracing::info!(admin_id = admin.id, rows = alerts.len(), "Alert export");

    Ok(CsvDownload {
        filename: format!("alerts-{}.csv", Utc::now().format("%Y%m%d-%H%M%S")),
        body: alerts_csv(&alerts),
    })
}

/// PUT /api/alerts/{id}/severity
pub async fn update_severity(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<SeverityRequest>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let severity = input.severity.parse::<Severity>()?;
    let alert = AlertRepo::update_severity(&state.pool, id, severity.as_str())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(alert_id = id, severity = %severity, admin_id = admin.id, "Alert severity changed");
    Ok(Json(DataResponse { data: alert }))
}

/// PUT /api/alerts/{id}/status
///
/// Illegal transitions are a 400. If the alert changed between the read and
/// the guarded write, the request fails with 409.
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let next = input.status.parse::<AlertStatus>()?;
    let (alert, current) = load(&state, id).await?;
    current.transition_to(next)?;
    if current == next {
        return Ok(Json(DataResponse { data: alert }));
    }

    let alert = AlertRepo::update_status(&state.pool, id, current, next)
        .await?
        .ok_or_else(|| changed_concurrently(id))?;

    tracing::info!(alert_id = id, from = %current, to = %next, admin_id = admin.id, "Alert status changed");
    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/alerts/{id}/assign
///
/// Puts the alert `Ongoing`, routes the responder's session to it and
/// notifies the responder, all in one transaction. Reassigning an `Ongoing`
/// alert releases the previous responder. A responder still on another
/// `Ongoing` alert is refused with 409.
pub async fn assign_responder(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<AssignRequest>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let (alert, current) = load(&state, id).await?;
    current.transition_to(AlertStatus::Ongoing)?;

    let (responder_name, admin_name) = tokio::try_join!(
        AccountRepo::name_of(&state.pool, AccountType::Responder, input.responder_id),
        AccountRepo::name_of(&state.pool, AccountType::Admin, admin.id),
    )?;
    let responder_name = responder_name.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Responder",
        id: input.responder_id,
    }))?;

    let place = alert
        .address
        .clone()
        .unwrap_or_else(|| format!("{:.5}, {:.5}", alert.lat, alert.lng));
    let notification = CreateNotification {
        account_type: AccountType::Responder.as_str().to_string(),
        account_id: input.responder_id,
        sender_type: SENDER_SYSTEM.to_string(),
        sender_id: Some(admin.id),
        sender_account_type: Some(AccountType::Admin.as_str().to_string()),
        sender_name: admin_name,
        recipient_name: Some(responder_name),
        message: format!(
            "You have been assigned to a {} alert ({}) at {place}.",
            alert.alert_type, alert.severity
        ),
    };

    let alert =
        match AlertRepo::assign_responder(&state.pool, id, current, input.responder_id, &notification)
            .await?
        {
            AssignOutcome::Assigned(alert) => alert,
            AssignOutcome::StatusChanged => return Err(changed_concurrently(id)),
            AssignOutcome::ResponderBusy(other) => {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Responder {} is already assigned to alert {other}",
                    input.responder_id
                ))))
            }
        };

    tracing::info!(
        alert_id = id,
        responder_id = input.responder_id,
        admin_id = admin.id,
        "Responder assigned",
    );
    Ok(Json(DataResponse { data: alert }))
}

// ---------------------------------------------------------------------------
// Resident and responder handlers
// ---------------------------------------------------------------------------

/// POST /api/alerts
///
/// A resident reports an incident at their position. Every admin is
/// notified; a notification failure does not undo the report.
pub async fn report_alert(
    State(state): State<AppState>,
    ResidentUser(resident): ResidentUser,
    Json(input): Json<ReportAlertRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Alert>>)> {
    let dto = validate_report(resident.id, &input)?;
    let alert = AlertRepo::create(&state.pool, &dto).await?;
    tracing::info!(alert_id = alert.id, user_id = resident.id, alert_type = %alert.alert_type, "Alert reported");

    let reporter = AccountRepo::name_of(&state.pool, AccountType::Resident, resident.id)
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| "A resident".to_string());
    let message = format!(
        "New {} alert from {reporter}{}.",
        alert.alert_type,
        alert
            .address
            .as_deref()
            .map(|a| format!(" at {a}"))
            .unwrap_or_default()
    );
    if let Err(e) = NotificationRepo::notify_all_admins(&state.pool, SENDER_SYSTEM, &message).await {
        tracing::warn!(error = %e, alert_id = alert.id, "Failed to notify admins of new alert");
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: alert })))
}

/// GET /api/responders/assignment
///
/// The alert the caller is routed to, or `null`.
pub async fn current_assignment(
    State(state): State<AppState>,
    ResponderUser(responder): ResponderUser,
) -> AppResult<Json<DataResponse<Option<Alert>>>> {
    let alert = AlertRepo::find_assigned_to_responder(&state.pool, responder.id).await?;
    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/responders/assignment/complete
///
/// Marks the assigned alert `Responded` and frees the session.
pub async fn complete_assignment(
    State(state): State<AppState>,
    ResponderUser(responder): ResponderUser,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = AlertRepo::complete_assignment(&state.pool, responder.id)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "No alert is assigned to you".into(),
        )))?;

    tracing::info!(alert_id = alert.id, responder_id = responder.id, "Assignment completed");
    Ok(Json(DataResponse { data: alert }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn report() -> ReportAlertRequest {
        ReportAlertRequest {
            alert_type: " Fire ".into(),
            lat: 13.41,
            lng: 122.56,
            severity: None,
            address: Some("Purok 3".into()),
            description: Some(" ".into()),
            image_url: None,
        }
    }

    #[test]
    fn report_defaults_severity() {
        let dto = validate_report(4, &report()).unwrap();
        assert_eq!(dto.alert_type, "Fire");
        assert_eq!(dto.severity, "medium");
        assert_eq!(dto.description, None);
        assert_eq!(dto.user_id, Some(4));
    }

    #[test]
    fn report_rejects_bad_coordinates_and_severity() {
        let bad_lat = ReportAlertRequest { lat: 91.0, ..report() };
        assert_matches!(
            validate_report(1, &bad_lat),
            Err(AppError::Core(CoreError::Validation(_)))
        );
        let bad_sev = ReportAlertRequest {
            severity: Some("extreme".into()),
            ..report()
        };
        assert!(validate_report(1, &bad_sev).is_err());
    }

    #[test]
    fn filters_are_normalised() {
        let params = AlertListParams {
            status: Some("not_responded".into()),
            severity: Some("HIGH".into()),
            alert_type: Some("  ".into()),
            ..Default::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.status.as_deref(), Some("Not Responded"));
        assert_eq!(query.severity.as_deref(), Some("high"));
        assert_eq!(query.alert_type, None);
    }

    #[test]
    fn inverted_range_rejected() {
        let params = AlertListParams {
            from: Some(Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_matches!(params.into_query(), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn csv_quotes_free_text() {
        let ts = Utc.with_ymd_and_hms(2026, 5, 1, 8, 30, 0).unwrap();
        let alert = Alert {
            id: 9,
            alert_type: "Flood".into(),
            status: "Not Responded".into(),
            severity: "high".into(),
            lat: 13.5,
            lng: 122.25,
            address: Some("Zone 1, Poblacion".into()),
            description: Some("water \"waist\" deep".into()),
            image_url: None,
            occurred_at: ts,
            responded_at: None,
            user_id: Some(2),
            responder_id: None,
            created_at: ts,
            updated_at: ts,
        };
        let csv = alerts_csv(&[alert]);
        let mut lines = csv.split("\r\n");
        assert_eq!(
            lines.next(),
            Some("id,type,status,severity,lat,lng,address,description,occurred_at,responded_at,user_id,responder_id")
        );
        assert_eq!(
            lines.next(),
            Some("9,Flood,Not Responded,high,13.5,122.25,\"Zone 1, Poblacion\",\"water \"\"waist\"\" deep\",2026-05-01T08:30:00+00:00,,2,")
        );
    }
}
