//! Account CRUD routes, mounted once per account table.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Routes mounted at `/users`, `/responders` and `/admins`. The account
/// type comes from an `Extension` layer on the mount.
///
/// ```text
/// GET    /        -> list_accounts
/// POST   /add     -> create_account
/// GET    /{id}    -> get_account
/// PUT    /{id}    -> update_account
/// DELETE /{id}    -> delete_account
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(accounts::list_accounts))
        .route("/add", post(accounts::create_account))
        .route(
            "/{id}",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
}
