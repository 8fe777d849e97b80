use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{chat, notifications};
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET  /               -> list_notifications
/// POST /               -> send_notification (admin)
/// GET  /unread-count   -> unread_count
/// POST /read-all       -> mark_all_read
/// POST /{id}/read      -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::list_notifications).post(notifications::send_notification),
        )
        .route("/unread-count", get(notifications::unread_count))
        .route("/read-all", post(notifications::mark_all_read))
        .route("/{id}/read", post(notifications::mark_read))
}

/// Routes mounted at `/chat`.
///
/// ```text
/// POST /                               -> send_message
/// GET  /{account_type}/{account_id}    -> thread
/// ```
pub fn chat_router() -> Router<AppState> {
    Router::new()
        .route("/", post(chat::send_message))
        .route("/{account_type}/{account_id}", get(chat::thread))
}
