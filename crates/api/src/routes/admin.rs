//! Dashboard, settings, security-log, lookup and upload routes.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::uploads::UPLOAD_BODY_LIMIT;
use crate::handlers::{address, dashboard, security_logs, settings, uploads};
use crate::state::AppState;

/// Routes mounted at `/settings`. Reading is public.
pub fn settings_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(settings::get_settings).put(settings::update_settings),
    )
}

/// Routes mounted at `/security-logs` (admin).
pub fn security_log_router() -> Router<AppState> {
    Router::new()
        .route("/", get(security_logs::list_logs))
        .route("/export", get(security_logs::export_logs))
}

/// Routes mounted at `/dashboard` (admin).
pub fn dashboard_router() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard::stats))
}

/// Routes mounted at `/address` (public).
pub fn address_router() -> Router<AppState> {
    Router::new()
        .route("/municipalities", get(address::list_municipalities))
        .route(
            "/municipalities/{id}/barangays",
            get(address::list_barangays),
        )
}

/// Routes mounted at `/uploads` (admin or responder).
pub fn uploads_router() -> Router<AppState> {
    Router::new()
        .route("/image", post(uploads::upload_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
