use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET  /               -> list_alerts (admin)
/// POST /               -> report_alert (resident)
/// GET  /export         -> export_alerts (admin, CSV)
/// GET  /{id}           -> get_alert (admin)
/// PUT  /{id}/severity  -> update_severity (admin)
/// PUT  /{id}/status    -> update_status (admin)
/// POST /{id}/assign    -> assign_responder (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts).post(alerts::report_alert))
        .route("/export", get(alerts::export_alerts))
        .route("/{id}", get(alerts::get_alert))
        .route("/{id}/severity", put(alerts::update_severity))
        .route("/{id}/status", put(alerts::update_status))
        .route("/{id}/assign", post(alerts::assign_responder))
}
