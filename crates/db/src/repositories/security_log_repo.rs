//! Repository for the `security_logs` table.
//!
//! Rows are append-only; there is no update or delete.

use sqlx::PgPool;

use crate::models::security_log::{CreateSecurityLog, SecurityLog, SecurityLogQuery};
use crate::models::{clamp_limit, clamp_offset, contains_pattern};

/// Column list for security log queries.
const COLUMNS: &str = "id, event_type, email, ip_address, severity, details, created_at";

/// Filter shared by `query`, `count` and `export`; binds `$1..=$5`, with
/// `$3` a [`contains_pattern`].
const FILTER: &str = "($1::TEXT IS NULL OR event_type = $1)
                  AND ($2::TEXT IS NULL OR severity = $2)
                  AND ($3::TEXT IS NULL OR email ILIKE $3 ESCAPE '\\')
                  AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
                  AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)";

/// Upper bound on rows in one CSV export.
pub const MAX_EXPORT_ROWS: i64 = 50_000;

/// Provides append and query operations for security logs.
pub struct SecurityLogRepo;

impl SecurityLogRepo {
    /// Append a log entry.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSecurityLog,
    ) -> Result<SecurityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO security_logs (event_type, email, ip_address, severity, details)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SecurityLog>(&query)
            .bind(&input.event_type)
            .bind(&input.email)
            .bind(&input.ip_address)
            .bind(&input.severity)
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// Query log entries, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &SecurityLogQuery,
    ) -> Result<Vec<SecurityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM security_logs
             WHERE {FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, SecurityLog>(&query)
            .bind(&params.event_type)
            .bind(&params.severity)
            .bind(params.email.as_deref().map(contains_pattern))
            .bind(params.from)
            .bind(params.to)
            .bind(clamp_limit(params.limit))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    /// Count log entries matching the filter (ignores limit/offset).
    pub async fn count(pool: &PgPool, params: &SecurityLogQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM security_logs WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(&params.event_type)
            .bind(&params.severity)
            .bind(params.email.as_deref().map(contains_pattern))
            .bind(params.from)
            .bind(params.to)
            .fetch_one(pool)
            .await
    }

    /// All matching entries, oldest first, for CSV export.
    pub async fn export(
        pool: &PgPool,
        params: &SecurityLogQuery,
    ) -> Result<Vec<SecurityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM security_logs
             WHERE {FILTER}
             ORDER BY created_at ASC, id ASC
             LIMIT {MAX_EXPORT_ROWS}"
        );
        sqlx::query_as::<_, SecurityLog>(&query)
            .bind(&params.event_type)
            .bind(&params.severity)
            .bind(params.email.as_deref().map(contains_pattern))
            .bind(params.from)
            .bind(params.to)
            .fetch_all(pool)
            .await
    }
}
