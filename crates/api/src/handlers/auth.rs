//! Login, logout and profile handlers for all three account types.
//!
//! Each account type authenticates against its own table and receives its
//! own cookie. The handlers are shared; the route layer passes the account
//! type in.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::roles::{AccountType, ROLE_CO_ADMIN};
use mdrrmo_core::security::event_types;
use mdrrmo_db::models::account::AccountResponse;
use mdrrmo_db::repositories::{AccountRepo, ResponderSessionRepo};
use serde::Deserialize;
use serde_json::json;

use crate::audit::{self, SecurityEvent};
use crate::auth::cookies::{cookie_name, removal_cookie, session_cookie};
use crate::auth::jwt::generate_token;
use crate::auth::password::check_login;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{claims_from_jar, AdminUser, ResidentUser, ResponderUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for every `POST .../login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login, /api/responders/login, /api/residents/login
///
/// Verify credentials against the account type's table, set its cookie and
/// return the profile. Unknown emails and wrong passwords produce the same
/// 401 and are both logged as `login_failed`.
pub async fn login(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountType>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<AccountResponse>>)> {
    let email = input.email.trim().to_lowercase();
    let account = AccountRepo::find_by_email(&state.pool, kind, &email).await?;

    let verified = check_login(
        &input.password,
        account.as_ref().map(|a| a.password_hash.as_str()),
    );
    let account = match account {
        Some(account) if verified => account,
        other => {
            audit::record(
                &state.pool,
                Some(&headers),
                SecurityEvent {
                    event_type: event_types::LOGIN_FAILED,
                    email: Some(&email),
                    details: json!({
                        "account_type": kind,
                        "reason": if other.is_some() { "bad_password" } else { "unknown_email" },
                    }),
                },
            )
            .await;
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid email or password".into(),
            )));
        }
    };

    let role = match kind {
        AccountType::Admin => account.role.as_deref().unwrap_or(ROLE_CO_ADMIN),
        other => other.as_str(),
    };
    let token = generate_token(kind, account.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    if kind == AccountType::Responder {
        ResponderSessionRepo::open(&state.pool, account.id).await?;
    }

    audit::record(
        &state.pool,
        Some(&headers),
        SecurityEvent {
            event_type: event_types::LOGIN_SUCCESS,
            email: Some(&account.email),
            details: json!({ "account_type": kind, "account_id": account.id, "role": role }),
        },
    )
    .await;
    tracing::info!(account_type = %kind, account_id = account.id, "Login succeeded");

    let jar = jar.add(session_cookie(
        cookie_name(kind),
        token,
        state.config.cookie_secure,
    ));
    Ok((jar, Json(DataResponse { data: account.into() })))
}

/// POST /api/auth/logout, /api/responders/logout, /api/residents/logout
///
/// Clears the cookie even when the token has already expired. A valid token
/// is logged, and a responder's session is marked offline.
pub async fn logout(
    State(state): State<AppState>,
    Extension(kind): Extension<AccountType>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<DataResponse<serde_json::Value>>)> {
    if let Some(claims) = claims_from_jar(&jar, kind, &state.config.jwt) {
        if kind == AccountType::Responder {
            ResponderSessionRepo::deactivate(&state.pool, claims.sub).await?;
        }
        let email = AccountRepo::find_by_id(&state.pool, kind, claims.sub)
            .await?
            .map(|a| a.email);
        audit::record(
            &state.pool,
            Some(&headers),
            SecurityEvent {
                event_type: event_types::LOGOUT,
                email: email.as_deref(),
                details: json!({ "account_type": kind, "account_id": claims.sub }),
            },
        )
        .await;
    }

    let jar = jar.remove(removal_cookie(cookie_name(kind)));
    Ok((jar, Json(DataResponse { data: json!({ "logged_out": true }) })))
}

async fn profile(
    state: &AppState,
    kind: AccountType,
    id: mdrrmo_core::types::DbId,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = AccountRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id,
        }))?;
    Ok(Json(DataResponse { data: account.into() }))
}

/// GET /api/auth/me
pub async fn admin_me(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    profile(&state, AccountType::Admin, admin.id).await
}

/// GET /api/responders/me
pub async fn responder_me(
    State(state): State<AppState>,
    ResponderUser(responder): ResponderUser,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    profile(&state, AccountType::Responder, responder.id).await
}

/// GET /api/residents/me
pub async fn resident_me(
    State(state): State<AppState>,
    ResidentUser(resident): ResidentUser,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    profile(&state, AccountType::Resident, resident.id).await
}
