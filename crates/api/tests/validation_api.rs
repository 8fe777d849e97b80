//! Request validation that completes before any database access.

mod common;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Request, StatusCode};
use common::{body_json, get, post_json, put_json};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn out_of_range_location_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/responders/location",
        Some(&common::responder_cookie(4)),
        json!({ "lat": 200.0, "lng": 123.3 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn negative_speed_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/responders/location",
        Some(&common::responder_cookie(4)),
        json!({ "lat": 13.4, "lng": 123.3, "speed": -1.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn alert_report_with_bad_coordinates_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/alerts",
        Some(&common::resident_cookie(9)),
        json!({ "type": "Fire", "lat": 13.4, "lng": 500.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_alert_status_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = put_json(
        app,
        "/api/alerts/1/status",
        Some(&common::admin_cookie(1)),
        json!({ "status": "Teleported" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inverted_alert_date_range_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(
        app,
        "/api/alerts?from=2026-03-10T00:00:00Z&to=2026-03-01T00:00:00Z",
        Some(&common::admin_cookie(1)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_settings_update_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = put_json(app, "/api/settings", Some(&common::admin_cookie(1)), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_setting_key_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = put_json(
        app,
        "/api/settings",
        Some(&common::admin_cookie(1)),
        json!({ "db_password": "https://example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_security_log_severity_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(
        app,
        "/api/security-logs?severity=debug",
        Some(&common::admin_cookie(1)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn messaging_yourself_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/chat",
        Some(&common::responder_cookie(4)),
        json!({ "account_type": "responder", "account_id": 4, "message": "hello" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_to_resident_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/chat",
        Some(&common::responder_cookie(4)),
        json!({ "account_type": "resident", "account_id": 9, "message": "stay put" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn admin_notification_to_resident_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/notifications",
        Some(&common::admin_cookie(1)),
        json!({ "account_type": "resident", "account_id": 9, "message": "evacuate" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn chat_thread_with_unknown_account_type_is_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/chat/robot/1", Some(&common::admin_cookie(1))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Integrations that are not configured
// ---------------------------------------------------------------------------

#[tokio::test]
async fn narrative_falls_back_to_template_without_model() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/pcr/narrative",
        Some(&common::responder_cookie(4)),
        json!({ "full_form": { "patient_name": "Ana Reyes", "chief_complaint": "chest pain" } }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["source"], "template");
    let narrative = json["data"]["narrative"].as_str().unwrap();
    assert!(narrative.starts_with("Ana Reyes was attended to."));
    assert!(narrative.contains("Chief complaint: chest pain."));
}

#[tokio::test]
async fn narrative_requires_object_form() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = post_json(
        app,
        "/api/pcr/narrative",
        Some(&common::admin_cookie(1)),
        json!({ "full_form": [1, 2, 3] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_without_cloudinary_is_unavailable() {
    let app = common::build_test_app(common::unreachable_pool());
    let request = Request::builder()
        .method("POST")
        .uri("/api/uploads/image")
        .header(COOKIE, common::admin_cookie(1))
        .header(CONTENT_TYPE, "multipart/form-data; boundary=X-BOUNDARY")
        .body(Body::from("--X-BOUNDARY--\r\n"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "SERVICE_UNAVAILABLE");
}
