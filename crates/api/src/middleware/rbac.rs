//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::roles::{AccountType, ROLE_ADMIN};
use mdrrmo_db::repositories::AccountRepo;
use mdrrmo_db::DbPool;
use sha2::{Digest, Sha256};

use super::auth::{AdminUser, AuthAccount};
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the scheduler's shared secret.
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Reject co-admins.
pub fn ensure_super_admin(admin: &AuthAccount) -> Result<(), AppError> {
    if admin.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin role required".into(),
        )));
    }
    Ok(())
}

/// Re-read the admin row behind a token before a write to the admin table.
///
/// A token keeps the role it was issued with until it expires. This catches
/// a demotion or deletion made since then.
pub async fn confirm_super_admin(pool: &DbPool, admin: &AuthAccount) -> Result<(), AppError> {
    match AccountRepo::find_by_id(pool, AccountType::Admin, admin.id).await? {
        Some(account) if account.role.as_deref() == Some(ROLE_ADMIN) => Ok(()),
        Some(_) => Err(AppError::Core(CoreError::Forbidden(
            "Admin role required".into(),
        ))),
        None => Err(AppError::Core(CoreError::Unauthorized(
            "Account no longer exists".into(),
        ))),
    }
}

/// Caller of a maintenance endpoint: an external scheduler presenting
/// `CRON_SECRET`, or a signed-in admin.
pub enum CronOrAdmin {
    Cron,
    Admin(AuthAccount),
}

impl FromRequestParts<AppState> for CronOrAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(CRON_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());

        if let Some(presented) = presented {
            return match state.config.cron_secret.as_deref() {
                Some(expected) if secrets_match(expected, presented) => Ok(CronOrAdmin::Cron),
                _ => Err(AppError::Core(CoreError::Unauthorized(
                    "Invalid cron secret".into(),
                ))),
            };
        }

        let AdminUser(admin) = AdminUser::from_request_parts(parts, state).await?;
        Ok(CronOrAdmin::Admin(admin))
    }
}

/// Compare two shared secrets in time independent of where they differ.
///
/// Both sides are hashed first, so the length of `expected` does not leak
/// either.
fn secrets_match(expected: &str, presented: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    expected
        .iter()
        .zip(presented.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
