//! Responder field-app and tracking routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{alerts, auth, tracking};
use crate::state::AppState;

/// Routes mounted at `/responders`, alongside the account CRUD routes.
///
/// ```text
/// POST /login                 -> login
/// POST /logout                -> logout
/// GET  /me                    -> responder_me
/// POST /location              -> update_location (responder)
/// POST /heartbeat             -> heartbeat (responder)
/// GET  /assignment            -> current_assignment (responder)
/// POST /assignment/complete   -> complete_assignment (responder)
/// GET  /tracking              -> list_tracking (admin)
/// GET  /{id}/history          -> location_history (admin)
/// POST /sessions/cleanup      -> cleanup_sessions (admin or cron)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::responder_me))
        .route("/location", post(tracking::update_location))
        .route("/heartbeat", post(tracking::heartbeat))
        .route("/assignment", get(alerts::current_assignment))
        .route("/assignment/complete", post(alerts::complete_assignment))
        .route("/tracking", get(tracking::list_tracking))
        .route("/{id}/history", get(tracking::location_history))
        .route("/sessions/cleanup", post(tracking::cleanup_sessions))
}
