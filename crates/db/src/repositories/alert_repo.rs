//! Repository for the `alerts` table.
//!
//! Status changes are guarded by the caller's view of the current status
//! (`WHERE status = $expected`), so a concurrent change makes the update
//! return `None` instead of silently overwriting it.

use mdrrmo_core::alert::AlertStatus;
use mdrrmo_core::tracking::{SESSION_AVAILABLE, SESSION_EN_ROUTE};
use mdrrmo_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::alert::{Alert, AlertQuery, AlertStatusCount, CreateAlert};
use crate::models::notification::CreateNotification;
use crate::models::{clamp_limit, clamp_offset};
use crate::repositories::NotificationRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, alert_type, status, severity, lat, lng, address, description, \
                       image_url, occurred_at, responded_at, user_id, responder_id, \
                       created_at, updated_at";

/// Same columns qualified with the `a` alias, for joins.
const A_COLUMNS: &str = "a.id, a.alert_type, a.status, a.severity, a.lat, a.lng, a.address, \
                         a.description, a.image_url, a.occurred_at, a.responded_at, a.user_id, \
                         a.responder_id, a.created_at, a.updated_at";

/// Filter shared by `query`, `count` and `export`; binds `$1..=$5`.
const FILTER: &str = "($1::TEXT IS NULL OR status = $1)
                  AND ($2::TEXT IS NULL OR severity = $2)
                  AND ($3::TEXT IS NULL OR alert_type = $3)
                  AND ($4::TIMESTAMPTZ IS NULL OR occurred_at >= $4)
                  AND ($5::TIMESTAMPTZ IS NULL OR occurred_at <= $5)";

/// Upper bound on rows in one CSV export.
pub const MAX_EXPORT_ROWS: i64 = 50_000;

/// Clears a session's assignment; `$1` is the alert id.
const RELEASE_SESSIONS: &str = "UPDATE responder_sessions SET
        assigned_alert_id = NULL,
        destination_lat = NULL,
        destination_lng = NULL,
        route_started_at = NULL,
        status = $2
     WHERE assigned_alert_id = $1";

/// Result of [`AlertRepo::assign_responder`].
#[derive(Debug)]
pub enum AssignOutcome {
    Assigned(Alert),
    /// The alert left the expected status before the update ran.
    StatusChanged,
    /// The responder is routed to this other `Ongoing` alert.
    ResponderBusy(DbId),
}

/// Provides CRUD and workflow operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new alert in `Not Responded`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts
                (alert_type, severity, lat, lng, address, description, image_url, user_id, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(&input.alert_type)
            .bind(&input.severity)
            .bind(input.lat)
            .bind(input.lng)
            .bind(&input.address)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(input.user_id)
            .bind(AlertStatus::NotResponded.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an alert by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List alerts matching the filter, newest first.
    pub async fn query(pool: &PgPool, params: &AlertQuery) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts
             WHERE {FILTER}
             ORDER BY occurred_at DESC, id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(&params.status)
            .bind(&params.severity)
            .bind(&params.alert_type)
            .bind(params.from)
            .bind(params.to)
            .bind(clamp_limit(params.limit))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    /// Count alerts matching the filter (ignores limit/offset).
    pub async fn count(pool: &PgPool, params: &AlertQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM alerts WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(&params.status)
            .bind(&params.severity)
            .bind(&params.alert_type)
            .bind(params.from)
            .bind(params.to)
            .fetch_one(pool)
            .await
    }

    /// All alerts matching the filter, oldest first, for CSV export.
    /// Limit and offset in `params` are ignored.
    pub async fn export(pool: &PgPool, params: &AlertQuery) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts
             WHERE {FILTER}
             ORDER BY occurred_at ASC, id ASC
             LIMIT {MAX_EXPORT_ROWS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(&params.status)
            .bind(&params.severity)
            .bind(&params.alert_type)
            .bind(params.from)
            .bind(params.to)
            .fetch_all(pool)
            .await
    }

    /// Set an alert's severity. Returns `None` if the alert does not exist.
    pub async fn update_severity(
        pool: &PgPool,
        id: DbId,
        severity: &str,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("UPDATE alerts SET severity = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(severity)
            .fetch_optional(pool)
            .await
    }

    /// Move an alert from `expected` to `next`.
    ///
    /// Entering `Responded` stamps `responded_at` (first time only). Returning
    /// to `Not Responded` drops the responder. Leaving `Ongoing` releases the
    /// responder session that was routed to the alert.
    ///
    /// Returns `None` if the alert does not exist or is no longer in `expected`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: AlertStatus,
        next: AlertStatus,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE alerts SET
                status = $2,
                responded_at = CASE WHEN $2 = 'Responded'
                                    THEN COALESCE(responded_at, NOW())
                                    ELSE responded_at END,
                responder_id = CASE WHEN $2 = 'Not Responded'
                                    THEN NULL
                                    ELSE responder_id END
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(next.as_str())
            .bind(expected.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(alert) = updated else {
            return Ok(None);
        };

        if next != AlertStatus::Ongoing {
            sqlx::query(RELEASE_SESSIONS)
                .bind(id)
                .bind(SESSION_AVAILABLE)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(alert))
    }

    /// Assign a responder to an alert.
    ///
    /// Runs in a transaction: the alert goes `Ongoing` with `responder_id`,
    /// any other session routed to the alert is released, the responder's
    /// session is pointed at the alert coordinates (`en_route`), and the
    /// responder is notified.
    ///
    /// The responder row is locked first, so two assignments of the same
    /// responder serialize. A responder already routed to a different
    /// `Ongoing` alert is refused with [`AssignOutcome::ResponderBusy`] and
    /// nothing is written.
    pub async fn assign_responder(
        pool: &PgPool,
        alert_id: DbId,
        expected: AlertStatus,
        responder_id: DbId,
        notification: &CreateNotification,
    ) -> Result<AssignOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM responders WHERE id = $1 FOR UPDATE")
            .bind(responder_id)
            .fetch_optional(&mut *tx)
            .await?;

        let busy_with: Option<DbId> = sqlx::query_scalar(
            "SELECT a.id FROM responder_sessions s
             JOIN alerts a ON a.id = s.assigned_alert_id
             WHERE s.responder_id = $1 AND a.status = $2 AND a.id <> $3",
        )
        .bind(responder_id)
        .bind(AlertStatus::Ongoing.as_str())
        .bind(alert_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(other) = busy_with {
            return Ok(AssignOutcome::ResponderBusy(other));
        }

        let query = format!(
            "UPDATE alerts SET status = $2, responder_id = $3
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Alert>(&query)
            .bind(alert_id)
            .bind(AlertStatus::Ongoing.as_str())
            .bind(responder_id)
            .bind(expected.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(alert) = updated else {
            return Ok(AssignOutcome::StatusChanged);
        };

        sqlx::query(&format!("{RELEASE_SESSIONS} AND responder_id <> $3"))
            .bind(alert_id)
            .bind(SESSION_AVAILABLE)
            .bind(responder_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO responder_sessions
                (responder_id, assigned_alert_id, destination_lat, destination_lng,
                 route_started_at, status)
             VALUES ($1, $2, $3, $4, NOW(), $5)
             ON CONFLICT (responder_id) DO UPDATE SET
                assigned_alert_id = EXCLUDED.assigned_alert_id,
                destination_lat = EXCLUDED.destination_lat,
                destination_lng = EXCLUDED.destination_lng,
                route_started_at = EXCLUDED.route_started_at,
                status = EXCLUDED.status",
        )
        .bind(responder_id)
        .bind(alert_id)
        .bind(alert.lat)
        .bind(alert.lng)
        .bind(SESSION_EN_ROUTE)
        .execute(&mut *tx)
        .await?;

        NotificationRepo::insert(&mut *tx, notification).await?;

        tx.commit().await?;
        Ok(AssignOutcome::Assigned(alert))
    }

    /// The alert the responder's session is currently routed to, if any.
    pub async fn find_assigned_to_responder(
        pool: &PgPool,
        responder_id: DbId,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {A_COLUMNS} FROM alerts a
             JOIN responder_sessions s ON s.assigned_alert_id = a.id
             WHERE s.responder_id = $1"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(responder_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark the responder's assigned alert `Responded` and free the session.
    ///
    /// Runs in a transaction. An alert that already reached a terminal status
    /// keeps it. Returns `None` if the responder has no assignment.
    pub async fn complete_assignment(
        pool: &PgPool,
        responder_id: DbId,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let assigned: Option<Option<DbId>> = sqlx::query_scalar(
            "SELECT assigned_alert_id FROM responder_sessions
             WHERE responder_id = $1
             FOR UPDATE",
        )
        .bind(responder_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(alert_id) = assigned.flatten() else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE alerts SET
                status = $2,
                responded_at = COALESCE(responded_at, NOW())
             WHERE id = $1 AND status IN ($3, $4)",
        )
        .bind(alert_id)
        .bind(AlertStatus::Responded.as_str())
        .bind(AlertStatus::NotResponded.as_str())
        .bind(AlertStatus::Ongoing.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(RELEASE_SESSIONS)
            .bind(alert_id)
            .bind(SESSION_AVAILABLE)
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        let alert = sqlx::query_as::<_, Alert>(&query)
            .bind(alert_id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(alert)
    }

    /// Number of alerts per status. Statuses with no alerts are omitted.
    pub async fn status_counts(pool: &PgPool) -> Result<Vec<AlertStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, AlertStatusCount>(
            "SELECT status, COUNT(*) AS count FROM alerts GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    /// Number of alerts that occurred at or after `since`.
    pub async fn count_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE occurred_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await
    }
}
