//! Resident, responder and admin account rows.
//!
//! The `users`, `responders` and `admins` tables share a shape, so a single
//! row struct serves all three; `role` is only populated for admins.

use chrono::NaiveDate;
use mdrrmo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full account row.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`AccountResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub password_hash: String,
    pub role: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe account representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            dob: account.dob,
            contact: account.contact,
            address: account.address,
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// DTO for inserting an account. Values are already validated and the
/// password already hashed.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub password_hash: String,
    /// Ignored for non-admin tables.
    pub role: Option<String>,
}

/// DTO for updating an account. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
}

/// Paginated account listing.
#[derive(Debug, Serialize)]
pub struct AccountPage {
    pub items: Vec<AccountResponse>,
    pub total: i64,
}
