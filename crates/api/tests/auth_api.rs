//! Cookie authentication and role checks at the HTTP boundary.
//!
//! These run against a pool that never connects: every request here is
//! rejected by an extractor or a role guard before any query is issued.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get, post_json, send};
use serde_json::json;

// ---------------------------------------------------------------------------
// Missing or mismatched cookies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_route_without_cookie_is_unauthorized() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/alerts", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/dashboard/stats", Some("auth=not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responder_token_in_admin_cookie_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let token_value = common::responder_cookie(7)
        .split_once('=')
        .map(|(_, v)| v.to_string())
        .unwrap();
    let cookie = format!("auth={token_value}");

    let response = get(app, "/api/dashboard/stats", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_cookie_does_not_grant_responder_routes() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/responders/location",
        Some(&common::admin_cookie(1)),
        json!({ "lat": 13.4, "lng": 123.3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn resident_cannot_read_alert_list() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/alerts", Some(&common::resident_cookie(3))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_without_cookie_is_unauthorized() {
    for uri in ["/api/auth/me", "/api/responders/me", "/api/residents/me"] {
        let app = common::build_test_app(common::unreachable_pool());
        let response = get(app, uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

// ---------------------------------------------------------------------------
// Super-admin guard on the admins table
// ---------------------------------------------------------------------------

#[tokio::test]
async fn co_admin_cannot_create_admins() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/admins/add",
        Some(&common::co_admin_cookie(2)),
        json!({
            "name": "New Admin",
            "email": "new@mdrrmo.example",
            "password": "longenough123",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn co_admin_cannot_list_admins() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/admins", Some(&common::co_admin_cookie(2))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_cannot_delete_own_account() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = send(
        app,
        Method::DELETE,
        "/api/admins/5",
        Some(&common::admin_cookie(5)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Cron secret
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_cron_secret_is_unauthorized() {
    let app = common::build_test_app(common::unreachable_pool());
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/responders/sessions/cleanup")
        .header("x-cron-secret", "guess")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cleanup_without_secret_or_cookie_is_unauthorized() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = send(app, Method::POST, "/api/responders/sessions/cleanup", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
