//! Cookie-based JWT extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::DbId;

use crate::auth::cookies::{cookie_name, ADMIN_COOKIE, RESPONDER_COOKIE};
use crate::auth::jwt::{validate_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated account, as read from a verified token.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub account_type: AccountType,
    /// Id within the account type's own table.
    pub id: DbId,
    /// `admin` / `co-admin` for admins; the account type otherwise.
    pub role: String,
}

impl From<Claims> for AuthAccount {
    fn from(claims: Claims) -> Self {
        Self {
            account_type: claims.account_type,
            id: claims.sub,
            role: claims.role,
        }
    }
}

/// Decode the token in `jar`'s cookie for `account_type`.
///
/// Returns `None` when the cookie is absent, the token is invalid or
/// expired, or it was issued to a different account type.
pub fn claims_from_jar(
    jar: &CookieJar,
    account_type: AccountType,
    jwt: &JwtConfig,
) -> Option<Claims> {
    let cookie = jar.get(cookie_name(account_type))?;
    let claims = validate_token(cookie.value(), jwt).ok()?;
    (claims.account_type == account_type).then_some(claims)
}

fn authenticate(
    parts: &Parts,
    state: &AppState,
    account_type: AccountType,
) -> Result<AuthAccount, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let name = cookie_name(account_type);
    if jar.get(name).is_none() {
        return Err(AppError::Core(CoreError::Unauthorized(format!(
            "Missing {name} cookie"
        ))));
    }
    claims_from_jar(&jar, account_type, &state.config.jwt)
        .map(AuthAccount::from)
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))
}

/// Authenticated admin or co-admin (cookie `auth`).
///
/// ```ignore
/// async fn my_handler(AdminUser(admin): AdminUser) -> AppResult<Json<()>> {
///     tracing::info!(admin_id = admin.id, role = %admin.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthAccount);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, AccountType::Admin).map(AdminUser)
    }
}

/// Authenticated responder (cookie `responderToken`).
#[derive(Debug, Clone)]
pub struct ResponderUser(pub AuthAccount);

impl FromRequestParts<AppState> for ResponderUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, AccountType::Responder).map(ResponderUser)
    }
}

/// Authenticated resident (cookie `residentToken`).
#[derive(Debug, Clone)]
pub struct ResidentUser(pub AuthAccount);

impl FromRequestParts<AppState> for ResidentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, AccountType::Resident).map(ResidentUser)
    }
}

/// An admin or a responder, for endpoints both can use (PCR forms,
/// notifications, chat, uploads).
///
/// The admin cookie wins when a browser carries both.
#[derive(Debug, Clone)]
pub struct Actor(pub AuthAccount);

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.0.account_type == AccountType::Admin
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let jwt = &state.config.jwt;

        let has_admin = jar.get(ADMIN_COOKIE).is_some();
        let has_responder = jar.get(RESPONDER_COOKIE).is_some();
        if !has_admin && !has_responder {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Authentication required".into(),
            )));
        }

        claims_from_jar(&jar, AccountType::Admin, jwt)
            .or_else(|| claims_from_jar(&jar, AccountType::Responder, jwt))
            .map(|claims| Actor(claims.into()))
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
            })
    }
}
