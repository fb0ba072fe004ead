//! Routing, auth and validation behavior that never reaches the database.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use giftmart_integration_tests::{body_json, empty_request, json_request, offline_app, send};

#[tokio::test]
async fn test_health_is_ok() {
    let app = offline_app();
    let response = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = offline_app();
    let response = send(&app, empty_request("GET", "/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = offline_app();
    for (method, uri) in [
        ("GET", "/api/admin/dashboard/stats"),
        ("GET", "/api/admin/sellers"),
        ("PATCH", "/api/admin/orders/4/status"),
        ("GET", "/api/notifications"),
        ("GET", "/api/support/tickets"),
        ("PUT", "/api/settings/tax"),
        ("GET", "/api/reports/summary"),
        ("GET", "/api/admin/analytics/export"),
    ] {
        let response = send(&app, empty_request(method, uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Authentication required");
    }
}

#[tokio::test]
async fn test_settings_and_support_routes_require_session() {
    let app = offline_app();
    for (method, uri) in [
        ("GET", "/api/settings"),
        ("GET", "/api/settings/email"),
        ("PUT", "/api/settings/security"),
        ("PUT", "/api/settings/payment-gateways/razorpay"),
        ("PATCH", "/api/settings/payment-gateways/cod/toggle"),
        ("POST", "/api/settings/api-keys"),
        ("DELETE", "/api/settings/roles/1"),
        ("POST", "/api/settings/backups"),
        ("GET", "/api/settings/greeting-cards"),
        ("GET", "/api/support"),
        ("POST", "/api/support/vendor-messages/3/reply"),
        ("PUT", "/api/support/sms-templates/2"),
        ("POST", "/api/support/help-docs/5/view"),
        ("PUT", "/api/support/system-status"),
        ("GET", "/api/admin/sellers/7/shipping"),
        ("DELETE", "/api/notifications/complaints/9"),
    ] {
        let response = send(&app, empty_request(method, uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = offline_app();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/admin/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", giftmart_integration_tests::TEST_CLIENT_IP)
        .body(axum::body::Body::from("{\"email\": "))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = offline_app();
    let response = send(&app, empty_request("GET", "/api/admin/nope", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Route not found");
}

#[tokio::test]
async fn test_login_rate_limited() {
    let app = offline_app();
    let body = json!({ "email": "", "password": "" });
    let mut limited = false;
    for _ in 0..10 {
        let response = send(&app, json_request("POST", "/api/admin/auth/login", &body, None)).await;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = true;
            break;
        }
    }
    assert!(limited, "burst of logins from one address should be throttled");
}
