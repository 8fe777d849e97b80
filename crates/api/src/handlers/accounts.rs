//! Account management for residents, responders and admins.
//!
//! The three tables share one set of handlers; the route layer supplies the
//! [`AccountType`]. Any admin may read accounts. Creating, changing or
//! deleting admin accounts additionally requires the `admin` role.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use mdrrmo_core::error::CoreError;
use mdrrmo_core::roles::{validate_admin_role, AccountType, ROLE_ADMIN, ROLE_CO_ADMIN};
use mdrrmo_core::security::event_types;
use mdrrmo_core::types::DbId;
use mdrrmo_core::validation::{
    normalize_contact, normalize_email, optional_text, validate_dob, validate_name,
    validate_password,
};
use mdrrmo_db::models::account::{AccountPage, AccountResponse, CreateAccount, UpdateAccount};
use mdrrmo_db::models::{clamp_limit, clamp_offset};
use mdrrmo_db::repositories::AccountRepo;
use serde::Deserialize;
use serde_json::json;

use crate::audit::{self, SecurityEvent};
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AdminUser, AuthAccount};
use crate::middleware::rbac::{confirm_super_admin, ensure_super_admin};
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/{users|responders|admins}/add`.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
    pub address: Option<String>,
    /// Admins only; defaults to `co-admin`.
    pub role: Option<String>,
}

/// Request body for `PUT /api/{users|responders|admins}/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub dob: Option<NaiveDate>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn hash(password: &str) -> AppResult<String> {
    validate_password(password)?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

fn validated_contact(contact: Option<&str>) -> AppResult<Option<String>> {
    Ok(optional_text(contact)
        .map(|c| normalize_contact(&c))
        .transpose()?)
}

fn validated_dob(dob: Option<NaiveDate>) -> AppResult<Option<NaiveDate>> {
    let today = Utc::now().date_naive();
    Ok(dob.map(|d| validate_dob(d, today)).transpose()?)
}

/// Validate a create request into the insert DTO.
pub fn validate_create(kind: AccountType, input: &CreateAccountRequest) -> AppResult<CreateAccount> {
    let role = match (kind, input.role.as_deref()) {
        (AccountType::Admin, Some(role)) => {
            validate_admin_role(role)?;
            Some(role.to_string())
        }
        (AccountType::Admin, None) => Some(ROLE_CO_ADMIN.to_string()),
        (_, Some(_)) => {
            return Err(AppError::BadRequest(format!(
                "Role applies to admin accounts only, not {kind}"
            )))
        }
        (_, None) => None,
    };

    Ok(CreateAccount {
        name: validate_name("Name", &input.name)?,
        email: normalize_email(&input.email)?,
        dob: validated_dob(input.dob)?,
        contact: validated_contact(input.contact.as_deref())?,
        address: optional_text(input.address.as_deref()),
        password_hash: hash(&input.password)?,
        role,
    })
}

/// Validate an update request into the update DTO.
///
/// `actor` is the admin making the change; an admin may not demote their
/// own account.
pub fn validate_update(
    kind: AccountType,
    id: DbId,
    actor: &AuthAccount,
    input: &UpdateAccountRequest,
) -> AppResult<UpdateAccount> {
    if let Some(role) = input.role.as_deref() {
        if kind != AccountType::Admin {
            return Err(AppError::BadRequest(format!(
                "Role applies to admin accounts only, not {kind}"
            )));
        }
        validate_admin_role(role)?;
        if id == actor.id && role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "You cannot remove your own admin role".into(),
            )));
        }
    }

    Ok(UpdateAccount {
        name: input
            .name
            .as_deref()
            .map(|n| validate_name("Name", n))
            .transpose()?,
        email: input.email.as_deref().map(normalize_email).transpose()?,
        dob: validated_dob(input.dob)?,
        contact: validated_contact(input.contact.as_deref())?,
        address: optional_text(input.address.as_deref()),
        password_hash: input.password.as_deref().map(hash).transpose()?,
        role: input.role.clone(),
    })
}

fn guard_admin_table(kind: AccountType, actor: &AuthAccount) -> AppResult<()> {
    if kind == AccountType::Admin {
        ensure_super_admin(actor)?;
    }
    Ok(())
}

/// Writes to the admin table also check the caller's current role.
async fn confirm_admin_write(
    state: &AppState,
    kind: AccountType,
    actor: &AuthAccount,
) -> AppResult<()> {
    if kind == AccountType::Admin {
        confirm_super_admin(&state.pool, actor).await?;
    }
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Account",
        id,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/{users|responders|admins}
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountType>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<AccountPage>>> {
    let search = params.term();
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let (accounts, total) = tokio::try_join!(
        AccountRepo::list(&state.pool, kind, search, limit, offset),
        AccountRepo::count(&state.pool, kind, search),
    )?;

    Ok(Json(DataResponse {
        data: AccountPage {
            items: accounts.into_iter().map(AccountResponse::from).collect(),
            total,
        },
    }))
}

/// GET /api/{users|responders|admins}/{id}
pub async fn get_account(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountType>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = AccountRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: account.into() }))
}

/// POST /api/{users|responders|admins}/add
///
/// Returns 201 with the new account. A duplicate email is a 409 from the
/// table's unique constraint.
pub async fn create_account(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountType>,
    AdminUser(admin): AdminUser,
    headers: HeaderMap,
    Json(input): Json<CreateAccountRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AccountResponse>>)> {
    guard_admin_table(kind, &admin)?;
    let dto = validate_create(kind, &input)?;
    confirm_admin_write(&state, kind, &admin).await?;
    let account = AccountRepo::create(&state.pool, kind, &dto).await?;

    tracing::info!(account_type = %kind, account_id = account.id, admin_id = admin.id, "Account created");
    audit::record(
        &state.pool,
        Some(&headers),
        SecurityEvent {
            event_type: event_types::ACCOUNT_CREATED,
            email: Some(&account.email),
            details: json!({
                "account_type": kind,
                "account_id": account.id,
                "role": account.role,
                "by_admin_id": admin.id,
            }),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: account.into() })))
}

/// PUT /api/{users|responders|admins}/{id}
///
/// Partial update. A new password is validated and re-hashed.
pub async fn update_account(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountType>,
    AdminUser(admin): AdminUser,
    Path(id): Path<DbId>,
    headers: HeaderMap,
    Json(input): Json<UpdateAccountRequest>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    guard_admin_table(kind, &admin)?;
    let dto = validate_update(kind, id, &admin, &input)?;
    confirm_admin_write(&state, kind, &admin).await?;
    let account = AccountRepo::update(&state.pool, kind, id, &dto)
        .await?
        .ok_or_else(|| not_found(id))?;

    let changed: Vec<&str> = [
        ("name", input.name.is_some()),
        ("email", input.email.is_some()),
        ("password", input.password.is_some()),
        ("dob", input.dob.is_some()),
        ("contact", input.contact.is_some()),
        ("address", input.address.is_some()),
        ("role", input.role.is_some()),
    ]
    .into_iter()
    .filter_map(|(field, set)| set.then_some(field))
    .collect();

    audit::record(
        &state.pool,
        Some(&headers),
        SecurityEvent {
            event_type: event_types::ACCOUNT_UPDATED,
            email: Some(&account.email),
            details: json!({
                "account_type": kind,
                "account_id": id,
                "fields": changed,
                "by_admin_id": admin.id,
            }),
        },
    )
    .await;

    Ok(Json(DataResponse { data: account.into() }))
}

/// DELETE /api/{users|responders|admins}/{id}
///
/// Returns 204. Admins cannot delete their own account.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountType>,
    AdminUser(admin): AdminUser,
    Path(id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    guard_admin_table(kind, &admin)?;
    if kind == AccountType::Admin && id == admin.id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot delete your own account".into(),
        )));
    }
    confirm_admin_write(&state, kind, &admin).await?;

    let account = AccountRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !AccountRepo::delete(&state.pool, kind, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(account_type = %kind, account_id = id, admin_id = admin.id, "Account deleted");
    audit::record(
        &state.pool,
        Some(&headers),
        SecurityEvent {
            event_type: event_types::ACCOUNT_DELETED,
            email: Some(&account.email),
            details: json!({ "account_type": kind, "account_id": id, "by_admin_id": admin.id }),
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn admin(id: DbId, role: &str) -> AuthAccount {
        AuthAccount {
            account_type: AccountType::Admin,
            id,
            role: role.to_string(),
        }
    }

    fn create_request() -> CreateAccountRequest {
        CreateAccountRequest {
            name: "  Maria Reyes ".into(),
            email: "Maria@Example.COM".into(),
            password: "long-enough-pw".into(),
            dob: None,
            contact: Some("+63 917 123 4567".into()),
            address: Some("  ".into()),
            role: None,
        }
    }

    #[test]
    fn create_normalises_fields() {
        let dto = validate_create(AccountType::Resident, &create_request()).unwrap();
        assert_eq!(dto.name, "Maria Reyes");
        assert_eq!(dto.email, "maria@example.com");
        assert_eq!(dto.contact.as_deref(), Some("09171234567"));
        assert_eq!(dto.address, None);
        assert!(dto.password_hash.starts_with("$argon2id$"));
        assert_eq!(dto.role, None);
    }

    #[test]
    fn admin_role_defaults_to_co_admin() {
        let dto = validate_create(AccountType::Admin, &create_request()).unwrap();
        assert_eq!(dto.role.as_deref(), Some(ROLE_CO_ADMIN));
    }

    #[test]
    fn role_rejected_for_non_admins() {
        let input = CreateAccountRequest {
            role: Some("admin".into()),
            ..create_request()
        };
        assert_matches!(
            validate_create(AccountType::Responder, &input),
            Err(AppError::BadRequest(_))
        );
    }

    #[test]
    fn short_password_rejected() {
        let input = CreateAccountRequest {
            password: "short".into(),
            ..create_request()
        };
        assert_matches!(
            validate_create(AccountType::Resident, &input),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[test]
    fn admin_cannot_demote_self() {
        let input = UpdateAccountRequest {
            role: Some(ROLE_CO_ADMIN.into()),
            ..Default::default()
        };
        assert_matches!(
            validate_update(AccountType::Admin, 7, &admin(7, ROLE_ADMIN), &input),
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert!(validate_update(AccountType::Admin, 8, &admin(7, ROLE_ADMIN), &input).is_ok());
    }

    #[test]
    fn update_rehashes_password() {
        let input = UpdateAccountRequest {
            password: Some("new-password-1".into()),
            ..Default::default()
        };
        let dto = validate_update(AccountType::Responder, 3, &admin(1, ROLE_ADMIN), &input).unwrap();
        assert!(dto.password_hash.unwrap().starts_with("$argon2id$"));
        assert_eq!(dto.name, None);
    }
}
