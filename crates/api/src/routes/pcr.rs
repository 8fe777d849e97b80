use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pcr;
use crate::state::AppState;

/// Routes mounted at `/pcr`. Admins and responders.
///
/// ```text
/// GET    /            -> list_forms
/// POST   /            -> create_form
/// POST   /narrative   -> generate_narrative
/// GET    /{id}        -> get_form
/// PUT    /{id}        -> update_form
/// DELETE /{id}        -> delete_form
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pcr::list_forms).post(pcr::create_form))
        .route("/narrative", post(pcr::generate_narrative))
        .route(
            "/{id}",
            get(pcr::get_form)
                .put(pcr::update_form)
                .delete(pcr::delete_form),
        )
}
