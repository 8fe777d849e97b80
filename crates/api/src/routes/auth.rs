//! Session routes shared by the three account types.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Admin session routes, mounted at `/auth`.
///
/// ```text
/// POST /login    -> login
/// POST /logout   -> logout
/// GET  /me       -> admin_me
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::admin_me))
}

/// Resident session routes, mounted at `/residents`.
pub fn resident_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::resident_me))
}
