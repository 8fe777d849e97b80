pub mod accounts;
pub mod admin;
pub mod alerts;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod pcr;
pub mod responders;

use axum::{Extension, Router};
use mdrrmo_core::roles::AccountType;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login, /auth/logout, /auth/me                admin session
/// /residents/login, /residents/logout, /residents/me resident session
///
/// /users, /responders, /admins                       list (admin)
/// /{users|responders|admins}/add                     create (admin; admins table: role admin)
/// /{users|responders|admins}/{id}                    get, update, delete
///
/// /responders/login, /logout, /me                    responder session
/// /responders/location                               location fix (responder)
/// /responders/heartbeat                              keep-alive (responder)
/// /responders/assignment                             current assignment (responder)
/// /responders/assignment/complete                    finish assignment (responder)
/// /responders/tracking                               live map (admin)
/// /responders/{id}/history                           breadcrumbs (admin)
/// /responders/sessions/cleanup                       stale sweep (admin or cron)
///
/// /alerts                                            list (admin), report (resident)
/// /alerts/export                                     CSV (admin)
/// /alerts/{id}                                       get (admin)
/// /alerts/{id}/severity, /status, /assign            workflow (admin)
///
/// /pcr, /pcr/{id}, /pcr/narrative                    PCR forms (admin or responder)
///
/// /notifications                                     inbox, admin send
/// /notifications/unread-count, /read-all, /{id}/read
/// /chat, /chat/{account_type}/{account_id}           chat
///
/// /settings                                          public read, admin write
/// /security-logs, /security-logs/export              admin
/// /dashboard/stats                                   admin
/// /address/municipalities[/{id}/barangays]           public lookups
/// /uploads/image                                     admin or responder
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest(
            "/auth",
            auth::admin_router().layer(Extension(AccountType::Admin)),
        )
        .nest(
            "/residents",
            auth::resident_router().layer(Extension(AccountType::Resident)),
        )
        .nest(
            "/users",
            accounts::router().layer(Extension(AccountType::Resident)),
        )
        .nest(
            "/admins",
            accounts::router().layer(Extension(AccountType::Admin)),
        )
        .nest(
            "/responders",
            accounts::router()
                .merge(responders::router())
                .layer(Extension(AccountType::Responder)),
        )
        .nest("/alerts", alerts::router())
        .nest("/pcr", pcr::router())
        .nest("/notifications", notifications::router())
        .nest("/chat", notifications::chat_router())
        .nest("/settings", admin::settings_router())
        .nest("/security-logs", admin::security_log_router())
        .nest("/dashboard", admin::dashboard_router())
        .nest("/address", admin::address_router())
        .nest("/uploads", admin::uploads_router())
}
