//! Repository for the `users`, `responders` and `admins` tables.
//!
//! The three tables share a shape, so every method takes the
//! [`AccountType`] that selects the table.

use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::{Account, CreateAccount, UpdateAccount};
use crate::models::contains_pattern;

/// Column list for the admins table.
const ADMIN_COLUMNS: &str =
    "id, name, email, dob, contact, address, password_hash, role, created_at, updated_at";

/// Column list for residents and responders, which have no role column.
const PLAIN_COLUMNS: &str = "id, name, email, dob, contact, address, password_hash, \
                             NULL::TEXT AS role, created_at, updated_at";

/// Search predicate shared by `list` and `count`; `$1` is a
/// [`contains_pattern`].
const SEARCH_FILTER: &str = "($1::TEXT IS NULL \
                             OR name ILIKE $1 ESCAPE '\\' \
                             OR email ILIKE $1 ESCAPE '\\' \
                             OR contact ILIKE $1 ESCAPE '\\')";

fn table(kind: AccountType) -> &'static str {
    match kind {
        AccountType::Admin => "admins",
        AccountType::Responder => "responders",
        AccountType::Resident => "users",
    }
}

fn columns(kind: AccountType) -> &'static str {
    match kind {
        AccountType::Admin => ADMIN_COLUMNS,
        _ => PLAIN_COLUMNS,
    }
}

/// Provides CRUD operations for accounts of every type.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    ///
    /// For admins a missing role defaults to `co-admin`.
    pub async fn create(
        pool: &PgPool,
        kind: AccountType,
        input: &CreateAccount,
    ) -> Result<Account, sqlx::Error> {
        let table = table(kind);
        let cols = columns(kind);
        let query = match kind {
            AccountType::Admin => format!(
                "INSERT INTO {table} (name, email, dob, contact, address, password_hash, role)
                 VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'co-admin'))
                 RETURNING {cols}"
            ),
            _ => format!(
                "INSERT INTO {table} (name, email, dob, contact, address, password_hash)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING {cols}"
            ),
        };
        let mut q = sqlx::query_as::<_, Account>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.dob)
            .bind(&input.contact)
            .bind(&input.address)
            .bind(&input.password_hash);
        if kind == AccountType::Admin {
            q = q.bind(&input.role);
        }
        q.fetch_one(pool).await
    }

    /// Find an account by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: AccountType,
        id: DbId,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1",
            columns(kind),
            table(kind)
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email. Callers pass the normalised (lower-case) email.
    pub async fn find_by_email(
        pool: &PgPool,
        kind: AccountType,
        email: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE email = $1",
            columns(kind),
            table(kind)
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List accounts newest first, optionally filtered by a search term.
    pub async fn list(
        pool: &PgPool,
        kind: AccountType,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE {SEARCH_FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
            columns(kind),
            table(kind)
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count accounts matching the same filter as [`AccountRepo::list`].
    pub async fn count(
        pool: &PgPool,
        kind: AccountType,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {} WHERE {SEARCH_FILTER}", table(kind));
        sqlx::query_scalar(&query)
            .bind(search.map(contains_pattern))
            .fetch_one(pool)
            .await
    }

    /// Update an account. Only non-`None` fields in `input` are applied;
    /// `role` is ignored outside the admins table.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        kind: AccountType,
        id: DbId,
        input: &UpdateAccount,
    ) -> Result<Option<Account>, sqlx::Error> {
        let role_assignment = match kind {
            AccountType::Admin => ",\n                role = COALESCE($8, role)",
            _ => "",
        };
        let query = format!(
            "UPDATE {} SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                dob = COALESCE($4, dob),
                contact = COALESCE($5, contact),
                address = COALESCE($6, address),
                password_hash = COALESCE($7, password_hash){role_assignment}
             WHERE id = $1
             RETURNING {}",
            table(kind),
            columns(kind)
        );
        let mut q = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.dob)
            .bind(&input.contact)
            .bind(&input.address)
            .bind(&input.password_hash);
        if kind == AccountType::Admin {
            q = q.bind(&input.role);
        }
        q.fetch_optional(pool).await
    }

    /// Delete an account. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, kind: AccountType, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", table(kind));
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether an account with this ID exists.
    pub async fn exists(pool: &PgPool, kind: AccountType, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table(kind));
        sqlx::query_scalar(&query).bind(id).fetch_one(pool).await
    }

    /// Display name of an account, if it exists.
    pub async fn name_of(
        pool: &PgPool,
        kind: AccountType,
        id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        let query = format!("SELECT name FROM {} WHERE id = $1", table(kind));
        sqlx::query_scalar(&query).bind(id).fetch_optional(pool).await
    }

    /// Total number of rows in the account table.
    pub async fn count_all(pool: &PgPool, kind: AccountType) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", table(kind));
        sqlx::query_scalar(&query).fetch_one(pool).await
    }
}
