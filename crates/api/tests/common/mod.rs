#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use mdrrmo_api::auth::cookies::cookie_name;
use mdrrmo_api::auth::jwt::{generate_token, JwtConfig};
use mdrrmo_api::config::ServerConfig;
use mdrrmo_api::router::build_app_router;
use mdrrmo_api::state::AppState;
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::DbId;

pub const CRON_SECRET: &str = "test-cron-secret";

/// Build a test `ServerConfig` with safe defaults and no integrations.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            expiry_hours: 1,
        },
        cookie_secure: false,
        session_active_window_secs: 300,
        session_cleanup_interval_secs: 60,
        cron_secret: Some(CRON_SECRET.to_string()),
        ollama: None,
        cloudinary: None,
        bootstrap_admin: None,
    }
}

/// A pool that never connects successfully. Requests that stop at
/// authentication or validation never touch it.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://nobody@127.0.0.1:1/none")
        .expect("lazy pool URL should parse")
}

/// Build the full application router over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

/// `Cookie` header value carrying a signed token for the given account.
pub fn auth_cookie(account_type: AccountType, id: DbId, role: &str) -> String {
    let token = generate_token(account_type, id, role, &test_config().jwt)
        .expect("token generation should succeed");
    format!("{}={token}", cookie_name(account_type))
}

pub fn admin_cookie(id: DbId) -> String {
    auth_cookie(AccountType::Admin, id, "admin")
}

pub fn co_admin_cookie(id: DbId) -> String {
    auth_cookie(AccountType::Admin, id, "co-admin")
}

pub fn responder_cookie(id: DbId) -> String {
    auth_cookie(AccountType::Responder, id, "responder")
}

pub fn resident_cookie(id: DbId) -> String {
    auth_cookie(AccountType::Resident, id, "resident")
}

/// Send a request with an optional cookie and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, cookie, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, cookie, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, cookie, Some(body)).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` pair of a `Set-Cookie` header for `name`, if present.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
