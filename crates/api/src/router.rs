//! Application router and its middleware stack.
//!
//! `main.rs` and the integration tests both go through [`build_app_router`],
//! so tests exercise the same CORS, request-id and timeout behaviour as
//! production.

use std::time::Duration;

use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::middleware::rbac::CRON_SECRET_HEADER;
use crate::routes;
use crate::state::AppState;

/// `/health` at the root, everything else under `/api`.
///
/// Layers run outermost first: CORS, request-id assignment, tracing,
/// request-id echo, timeout, panic recovery.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    // Each `layer` call wraps the previous ones, so the last one listed
    // (CORS) sees the request first.
    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// CORS for the dashboard and mobile web origins.
///
/// Auth rides in cookies, so origins are listed explicitly and credentials
/// are allowed. Unparseable origins are dropped with a warning.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|e| tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            COOKIE,
            HeaderName::from_static(CRON_SECRET_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_origins_are_skipped() {
        let mut config = ServerConfig::from_lookup(|name| match name {
            "DATABASE_URL" => Some("postgres://localhost/mdrrmo".into()),
            "JWT_SECRET" => Some("secret".into()),
            _ => None,
        })
        .unwrap();
        config.cors_origins = vec!["http://ok.example".into(), "bad\norigin".into()];
        // Building must not panic on the bad entry.
        let _ = build_cors_layer(&config);
    }
}
