//! Health check, OpenAPI document and cross-cutting headers.

mod helpers;

use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_database() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;

    let body: Value = app.client().get("/api-docs/openapi.json").await.json();
    assert!(body["paths"]["/api/v1/uploads/request"].is_object());
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health")
        .add_header("x-request-id", "req-123")
        .await;

    assert_eq!(response.header("x-request-id"), "req-123");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
}
