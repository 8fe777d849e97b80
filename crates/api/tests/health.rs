//! Health endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_carries_request_id() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/health", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn health_ok_with_database(pool: sqlx::PgPool) {
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/health", None).await).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}
