//! Repository for the `pcr_forms` table.
//!
//! Every read and write takes an optional creator scope. `None` means the
//! caller is an admin and sees all forms; `Some((type, id))` restricts the
//! query to forms that caller created.

use mdrrmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::pcr_form::{CreatePcrForm, PcrForm, PcrQuery, UpdatePcrForm};
use crate::models::{clamp_limit, clamp_offset, contains_pattern};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, patient_name, incident_date, location, recorder, full_form, \
                       created_by_type, created_by_id, created_at, updated_at";

/// Restricts a query to one creator; binds `$1` (type) and `$2` (id).
const SCOPE: &str = "($1::TEXT IS NULL OR (created_by_type = $1 AND created_by_id = $2))";

/// Matches `$3`, a [`contains_pattern`], against the text columns.
const SEARCH: &str = "($3::TEXT IS NULL
                    OR patient_name ILIKE $3 ESCAPE '\\'
                    OR location ILIKE $3 ESCAPE '\\'
                    OR recorder ILIKE $3 ESCAPE '\\')";

/// Creator filter: `(created_by_type, created_by_id)`.
pub type Owner<'a> = Option<(&'a str, DbId)>;

fn split(owner: Owner<'_>) -> (Option<&str>, Option<DbId>) {
    match owner {
        Some((kind, id)) => (Some(kind), Some(id)),
        None => (None, None),
    }
}

/// Provides CRUD operations for patient care reports.
pub struct PcrFormRepo;

impl PcrFormRepo {
    /// Insert a new form, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePcrForm) -> Result<PcrForm, sqlx::Error> {
        let query = format!(
            "INSERT INTO pcr_forms
                (patient_name, incident_date, location, recorder, full_form,
                 created_by_type, created_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PcrForm>(&query)
            .bind(&input.patient_name)
            .bind(input.incident_date)
            .bind(&input.location)
            .bind(&input.recorder)
            .bind(&input.full_form)
            .bind(&input.created_by_type)
            .bind(input.created_by_id)
            .fetch_one(pool)
            .await
    }

    /// Find a form by ID within the owner scope.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        owner: Owner<'_>,
    ) -> Result<Option<PcrForm>, sqlx::Error> {
        let (kind, owner_id) = split(owner);
        let query = format!("SELECT {COLUMNS} FROM pcr_forms WHERE {SCOPE} AND id = $3");
        sqlx::query_as::<_, PcrForm>(&query)
            .bind(kind)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List forms newest first within the owner scope.
    pub async fn list(
        pool: &PgPool,
        params: &PcrQuery,
        owner: Owner<'_>,
    ) -> Result<Vec<PcrForm>, sqlx::Error> {
        let (kind, owner_id) = split(owner);
        let query = format!(
            "SELECT {COLUMNS} FROM pcr_forms
             WHERE {SCOPE}
               AND {SEARCH}
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, PcrForm>(&query)
            .bind(kind)
            .bind(owner_id)
            .bind(params.search.as_deref().map(contains_pattern))
            .bind(clamp_limit(params.limit))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    /// Count forms matching the same filter as [`PcrFormRepo::list`].
    pub async fn count(
        pool: &PgPool,
        params: &PcrQuery,
        owner: Owner<'_>,
    ) -> Result<i64, sqlx::Error> {
        let (kind, owner_id) = split(owner);
        let query = format!(
            "SELECT COUNT(*) FROM pcr_forms
             WHERE {SCOPE}
               AND {SEARCH}"
        );
        sqlx::query_scalar(&query)
            .bind(kind)
            .bind(owner_id)
            .bind(params.search.as_deref().map(contains_pattern))
            .fetch_one(pool)
            .await
    }

    /// Update a form within the owner scope. Only non-`None` fields are applied.
    ///
    /// Returns `None` if the form does not exist or is outside the scope.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePcrForm,
        owner: Owner<'_>,
    ) -> Result<Option<PcrForm>, sqlx::Error> {
        let (kind, owner_id) = split(owner);
        let query = format!(
            "UPDATE pcr_forms SET
                patient_name = COALESCE($4, patient_name),
                incident_date = COALESCE($5, incident_date),
                location = COALESCE($6, location),
                recorder = COALESCE($7, recorder),
                full_form = COALESCE($8, full_form)
             WHERE {SCOPE} AND id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PcrForm>(&query)
            .bind(kind)
            .bind(owner_id)
            .bind(id)
            .bind(&input.patient_name)
            .bind(input.incident_date)
            .bind(&input.location)
            .bind(&input.recorder)
            .bind(&input.full_form)
            .fetch_optional(pool)
            .await
    }

    /// Delete a form within the owner scope. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, owner: Owner<'_>) -> Result<bool, sqlx::Error> {
        let (kind, owner_id) = split(owner);
        let query = format!("DELETE FROM pcr_forms WHERE {SCOPE} AND id = $3");
        let result = sqlx::query(&query)
            .bind(kind)
            .bind(owner_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
