//! Security log viewer and CSV export.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use mdrrmo_core::csv::CsvBuilder;
use mdrrmo_core::security::is_known_severity;
use mdrrmo_core::types::Timestamp;
use mdrrmo_core::validation::optional_text;
use mdrrmo_db::models::security_log::{SecurityLog, SecurityLogPage, SecurityLogQuery};
use mdrrmo_db::repositories::SecurityLogRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminUser;
use crate::response::{CsvDownload, DataResponse};
use crate::state::AppState;

/// Query parameters for the list and export endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SecurityLogParams {
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub email: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SecurityLogParams {
    pub fn into_query(self) -> AppResult<SecurityLogQuery> {
        let severity = optional_text(self.severity.as_deref()).map(|s| s.to_lowercase());
        if let Some(severity) = &severity {
            if !is_known_severity(severity) {
                return Err(AppError::BadRequest(format!(
                    "Unknown severity '{severity}'"
                )));
            }
        }
        Ok(SecurityLogQuery {
            event_type: optional_text(self.event_type.as_deref()),
            severity,
            email: optional_text(self.email.as_deref()),
            from: self.from,
            to: self.to,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

fn logs_csv(logs: &[SecurityLog]) -> String {
    let mut csv = CsvBuilder::with_header(&[
        "id",
        "created_at",
        "event_type",
        "severity",
        "email",
        "ip_address",
        "details",
    ]);
    for log in logs {
        csv.push_row([
            log.id.to_string(),
            log.created_at.to_rfc3339(),
            log.event_type.clone(),
            log.severity.clone(),
            log.email.clone().unwrap_or_default(),
            log.ip_address.clone().unwrap_or_default(),
            log.details
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ]);
    }
    csv.finish()
}

/// GET /api/security-logs
pub async fn list_logs(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<SecurityLogParams>,
) -> AppResult<Json<DataResponse<SecurityLogPage>>> {
    let query = params.into_query()?;
    let (items, total) = tokio::try_join!(
        SecurityLogRepo::query(&state.pool, &query),
        SecurityLogRepo::count(&state.pool, &query),
    )?;
    Ok(Json(DataResponse {
        data: SecurityLogPage { items, total },
    }))
}

/// GET /api/security-logs/export
pub async fn export_logs(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(params): Query<SecurityLogParams>,
) -> AppResult<CsvDownload> {
    let query = params.into_query()?;
    let logs = SecurityLogRepo::export(&state.pool, &query).await?;
    tracing::info!(admin_id = admin.id, rows = logs.len(), "Security log export");

    Ok(CsvDownload {
        filename: format!("security-logs-{}.csv", Utc::now().format("%Y%m%d-%H%M%S")),
        body: logs_csv(&logs),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn unknown_severity_rejected() {
        let params = SecurityLogParams {
            severity: Some("debug".into()),
            ..Default::default()
        };
        assert!(params.into_query().is_err());

        let params = SecurityLogParams {
            severity: Some("Warning".into()),
            ..Default::default()
        };
        assert_eq!(params.into_query().unwrap().severity.as_deref(), Some("warning"));
    }

    #[test]
    fn details_json_is_quoted() {
        let log = SecurityLog {
            id: 1,
            event_type: "login_failed".into(),
            email: Some("a@b.ph".into()),
            ip_address: None,
            severity: "warning".into(),
            details: Some(serde_json::json!({ "reason": "bad_password" })),
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };
        let csv = logs_csv(&[log]);
        assert!(csv.ends_with(
            "1,2026-01-02T03:04:05+00:00,login_failed,warning,a@b.ph,,\"{\"\"reason\"\":\"\"bad_password\"\"}\"\r\n"
        ));
    }
}
