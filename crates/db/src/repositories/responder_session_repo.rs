//! Repository for `responder_sessions` and `responder_location_history`.

use mdrrmo_core::tracking::{LocationFix, SESSION_AVAILABLE, SESSION_EN_ROUTE, SESSION_OFFLINE};
use mdrrmo_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::responder_session::{LocationPoint, ResponderSession, TrackingRow};

/// Column list for `responder_sessions` queries.
const COLUMNS: &str = "id, responder_id, current_lat, current_lng, heading, speed, accuracy, \
                       assigned_alert_id, destination_lat, destination_lng, route_started_at, \
                       status, is_active, last_active_at, created_at, updated_at";

const HISTORY_COLUMNS: &str =
    "id, responder_id, session_id, lat, lng, heading, speed, accuracy, recorded_at";

/// Status a session returns to when it comes back online; binds `$2`
/// (available) and `$3` (en route).
const REVIVED_STATUS: &str = "CASE WHEN responder_sessions.assigned_alert_id IS NULL \
                              THEN $2 ELSE $3 END";

/// Hard cap on breadcrumbs returned by one history request.
pub const MAX_HISTORY_POINTS: i64 = 1000;

/// Provides session lifecycle and location tracking operations.
pub struct ResponderSessionRepo;

impl ResponderSessionRepo {
    /// Open (or reactivate) the responder's session at login.
    ///
    /// An existing assignment survives a re-login and the session resumes
    /// `en_route`; otherwise it becomes `available`.
    pub async fn open(pool: &PgPool, responder_id: DbId) -> Result<ResponderSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO responder_sessions (responder_id, status, is_active, last_active_at)
             VALUES ($1, $2, true, NOW())
             ON CONFLICT (responder_id) DO UPDATE SET
                is_active = true,
                last_active_at = NOW(),
                status = {REVIVED_STATUS}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResponderSession>(&query)
            .bind(responder_id)
            .bind(SESSION_AVAILABLE)
            .bind(SESSION_EN_ROUTE)
            .fetch_one(pool)
            .await
    }

    /// Find the session row for a responder.
    pub async fn find_by_responder(
        pool: &PgPool,
        responder_id: DbId,
    ) -> Result<Option<ResponderSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM responder_sessions WHERE responder_id = $1");
        sqlx::query_as::<_, ResponderSession>(&query)
            .bind(responder_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a location fix.
    ///
    /// Runs in a transaction: upsert the session's current position, then
    /// append a history row pointing at that session. Either both rows are
    /// written or neither is.
    pub async fn record_location(
        pool: &PgPool,
        responder_id: DbId,
        fix: &LocationFix,
    ) -> Result<ResponderSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO responder_sessions
                (responder_id, current_lat, current_lng, heading, speed, accuracy,
                 status, is_active, last_active_at)
             VALUES ($1, $4, $5, $6, $7, $8, $2, true, NOW())
             ON CONFLICT (responder_id) DO UPDATE SET
                current_lat = EXCLUDED.current_lat,
                current_lng = EXCLUDED.current_lng,
                heading = EXCLUDED.heading,
                speed = EXCLUDED.speed,
                accuracy = EXCLUDED.accuracy,
                is_active = true,
                last_active_at = NOW(),
                status = CASE WHEN responder_sessions.status = $9
                              THEN {REVIVED_STATUS}
                              ELSE responder_sessions.status END
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, ResponderSession>(&query)
            .bind(responder_id)
            .bind(SESSION_AVAILABLE)
            .bind(SESSION_EN_ROUTE)
            .bind(fix.lat)
            .bind(fix.lng)
            .bind(fix.heading)
            .bind(fix.speed)
            .bind(fix.accuracy)
            .bind(SESSION_OFFLINE)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO responder_location_history
                (responder_id, session_id, lat, lng, heading, speed, accuracy)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(responder_id)
        .bind(session.id)
        .bind(fix.lat)
        .bind(fix.lng)
        .bind(fix.heading)
        .bind(fix.speed)
        .bind(fix.accuracy)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Mark the responder's session alive without moving it.
    ///
    /// Returns `false` if the responder has no session yet.
    pub async fn heartbeat(pool: &PgPool, responder_id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE responder_sessions SET
                is_active = true,
                last_active_at = NOW(),
                status = CASE WHEN status = $4 THEN {REVIVED_STATUS} ELSE status END
             WHERE responder_id = $1"
        );
        let result = sqlx::query(&query)
            .bind(responder_id)
            .bind(SESSION_AVAILABLE)
            .bind(SESSION_EN_ROUTE)
            .bind(SESSION_OFFLINE)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Live sessions (active and seen after `cutoff`) joined with the
    /// responder and the assigned alert.
    pub async fn list_active(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<TrackingRow>, sqlx::Error> {
        sqlx::query_as::<_, TrackingRow>(
            "SELECT
                s.id AS session_id,
                s.responder_id,
                r.name AS responder_name,
                r.contact AS responder_contact,
                s.current_lat, s.current_lng, s.heading, s.speed, s.accuracy,
                s.status, s.last_active_at,
                s.assigned_alert_id, s.destination_lat, s.destination_lng, s.route_started_at,
                a.alert_type, a.severity AS alert_severity,
                a.status AS alert_status, a.address AS alert_address
             FROM responder_sessions s
             JOIN responders r ON r.id = s.responder_id
             LEFT JOIN alerts a ON a.id = s.assigned_alert_id
             WHERE s.is_active = true AND s.last_active_at > $1
             ORDER BY s.last_active_at DESC",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// Number of live sessions.
    pub async fn count_active(pool: &PgPool, cutoff: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM responder_sessions
             WHERE is_active = true AND last_active_at > $1",
        )
        .bind(cutoff)
        .fetch_one(pool)
        .await
    }

    /// Breadcrumbs for a responder, oldest first, optionally since a point
    /// in time. `limit` is capped at [`MAX_HISTORY_POINTS`].
    pub async fn history(
        pool: &PgPool,
        responder_id: DbId,
        since: Option<Timestamp>,
        limit: i64,
    ) -> Result<Vec<LocationPoint>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM responder_location_history
             WHERE responder_id = $1 AND ($2::TIMESTAMPTZ IS NULL OR recorded_at >= $2)
             ORDER BY recorded_at ASC, id ASC
             LIMIT $3"
        );
        sqlx::query_as::<_, LocationPoint>(&query)
            .bind(responder_id)
            .bind(since)
            .bind(limit.clamp(1, MAX_HISTORY_POINTS))
            .fetch_all(pool)
            .await
    }

    /// Mark the responder's session offline (logout).
    pub async fn deactivate(pool: &PgPool, responder_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE responder_sessions SET is_active = false, status = $2
             WHERE responder_id = $1 AND is_active = true",
        )
        .bind(responder_id)
        .bind(SESSION_OFFLINE)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every active session not seen since `cutoff` offline.
    ///
    /// Returns the number of sessions deactivated.
    pub async fn deactivate_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE responder_sessions SET is_active = false, status = $2
             WHERE is_active = true AND last_active_at <= $1",
        )
        .bind(cutoff)
        .bind(SESSION_OFFLINE)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
