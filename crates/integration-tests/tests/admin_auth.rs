//! Login, logout and route protection.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use shopdesk_integration_tests::{ADMIN, SUPER_ADMIN, TestApp};

#[tokio::test]
async fn test_health_endpoints_need_no_session() {
    let app = TestApp::new().await;

    let live = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(live.status, StatusCode::OK);

    let ready = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/refunds", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "not_found");
    assert_eq!(response.body["error"], "no route for /api/refunds");
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = TestApp::new().await;

    for uri in [
        "/api/orders",
        "/api/payments",
        "/api/dashboard/stats",
        "/api/settings/company",
        "/api/auth/me",
    ] {
        let response = app.request(Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.body["code"], "unauthorized");
    }
}

#[tokio::test]
async fn test_login_reports_role() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": SUPER_ADMIN.0, "password": SUPER_ADMIN.1 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["role"], "super_admin");
    assert!(response.cookie.is_some());

    let cookie = app.login(ADMIN).await;
    let me = app.get("/api/auth/me", &cookie).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "priya");
    assert_eq!(me.body["role"], "admin");
}

#[tokio::test]
async fn test_bad_credentials_are_rejected() {
    let app = TestApp::new().await;

    for (username, password) in [
        (SUPER_ADMIN.0, "wrong"),
        (ADMIN.0, "wrong"),
        ("admin", "admin123"),
    ] {
        let response = app
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{username}");
        assert_eq!(response.body["code"], "unauthorized");
    }
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": " ", "password": "" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "bad_request");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    let cookie = app.login(ADMIN).await;

    assert_eq!(app.get("/api/orders", &cookie).await.status, StatusCode::OK);

    let logout = app.post("/api/auth/logout", &cookie, None).await;
    assert_eq!(logout.status, StatusCode::OK);

    assert_eq!(
        app.get("/api/orders", &cookie).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new().await;
    let cookie = app.login(ADMIN).await;
    let response = app.get("/api/orders", &cookie).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["cache-control"], "no-store");
}
