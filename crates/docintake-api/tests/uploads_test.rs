//! Upload coordinator and completion notifier over HTTP.
//!
//! Run with: `cargo test -p docintake-api --test uploads_test`

mod helpers;

use axum::http::StatusCode;
use docintake_core::models::DocumentStatus;
use helpers::{api_path, setup_test_app, upload_body, FILES_BASE_URL, UPLOAD_EXPIRY_SECS};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_request_upload_creates_pending_record() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads/request"))
        .json(&upload_body("user-1", "report.pdf"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["uploadMethod"], "PUT");
    assert_eq!(body["expiresIn"], UPLOAD_EXPIRY_SECS);

    let file_id = Uuid::parse_str(body["fileId"].as_str().unwrap()).unwrap();
    let storage_key = body["storageKey"].as_str().unwrap();
    assert!(storage_key.starts_with("uploads/user-1/"));
    assert!(storage_key.ends_with(&format!("{}.pdf", file_id)));
    assert_eq!(
        body["uploadUrl"],
        format!("{}/{}", FILES_BASE_URL, storage_key)
    );

    let record = app.record(file_id).await.expect("record persisted");
    assert_eq!(record.status, DocumentStatus::Pending);
    assert_eq!(record.user_id, "user-1");
    assert_eq!(record.file_size_bytes, 1024);
    assert_eq!(record.storage_key, storage_key);
    assert!(app.queue.inner.is_empty().await);
}

#[tokio::test]
async fn test_request_upload_accepts_legacy_field_names() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads/request"))
        .json(&json!({
            "userId": "user-1",
            "fileName": "scan.png",
            "fileSize": 512,
            "fileType": "image/png"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn test_zero_byte_upload_is_rejected_before_any_side_effect() {
    let app = setup_test_app().await;

    let mut body = upload_body("user-1", "empty.pdf");
    body["fileSizeBytes"] = json!(0);
    let response = app
        .client()
        .post(&api_path("/uploads/request"))
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(app.repository.is_empty().await);
    assert_eq!(app.storage.put_urls_issued(), 0);
}

#[tokio::test]
async fn test_unsupported_content_type_is_rejected() {
    let app = setup_test_app().await;

    let mut body = upload_body("user-1", "movie.mp4");
    body["contentType"] = json!("video/mp4");
    let response = app
        .client()
        .post(&api_path("/uploads/request"))
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads/request"))
        .json(&json!({ "userId": "user-1" }))
        .await;

    assert!(response.status_code().is_client_error());
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_signing_failure_leaves_no_record() {
    let app = setup_test_app().await;
    app.storage.fail_signing(true);

    let response = app
        .client()
        .post(&api_path("/uploads/request"))
        .json(&upload_body("user-1", "report.pdf"))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let error: Value = response.json();
    assert_eq!(error["code"], "STORAGE_UNAVAILABLE");
    assert_eq!(error["recoverable"], true);
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_complete_upload_enqueues_and_marks_processing() {
    let app = setup_test_app().await;
    let file_id = app.request_upload("user-1", "report.pdf").await;

    let response = app
        .client()
        .post(&api_path("/uploads/complete"))
        .json(&json!({ "fileId": file_id }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "processing");
    assert_eq!(body["message"], "File queued for processing.");

    let record = app.record(file_id).await.unwrap();
    assert_eq!(record.status, DocumentStatus::Processing);

    let items = app.queue.inner.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].file_id, file_id);
    assert_eq!(items[0].user_id, "user-1");
    assert_eq!(items[0].file_type, "application/pdf");
    assert_eq!(items[0].s3_location.key, record.storage_key);
}

#[tokio::test]
async fn test_enqueue_failure_leaves_record_pending() {
    let app = setup_test_app().await;
    let file_id = app.request_upload("user-1", "report.pdf").await;
    app.queue.fail_enqueue(true);

    let response = app
        .client()
        .post(&api_path("/uploads/complete"))
        .json(&json!({ "fileId": file_id }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let error: Value = response.json();
    assert_eq!(error["code"], "QUEUE_UNAVAILABLE");
    assert_eq!(
        app.record(file_id).await.unwrap().status,
        DocumentStatus::Pending
    );
    assert!(app.queue.inner.is_empty().await);

    // Once the queue is back the same notification goes through
    app.queue.fail_enqueue(false);
    app.client()
        .post(&api_path("/uploads/complete"))
        .json(&json!({ "fileId": file_id }))
        .await
        .assert_status_ok();
    assert_eq!(app.queue.inner.len().await, 1);
}

#[tokio::test]
async fn test_complete_twice_is_a_conflict() {
    let app = setup_test_app().await;
    let file_id = app.request_upload("user-1", "report.pdf").await;

    app.client()
        .post(&api_path("/uploads/complete"))
        .json(&json!({ "fileId": file_id }))
        .await
        .assert_status_ok();

    let response = app
        .client()
        .post(&api_path("/uploads/complete"))
        .json(&json!({ "fileId": file_id }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_STATE_TRANSITION");
    assert_eq!(app.queue.inner.len().await, 1);
}

#[tokio::test]
async fn test_complete_unknown_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads/complete"))
        .json(&json!({ "fileId": Uuid::new_v4() }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(app.queue.inner.is_empty().await);
}

#[tokio::test]
async fn test_local_upload_url_accepts_the_object() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads/request"))
        .json(&upload_body("user-1", "notes.pdf"))
        .await;
    let body: Value = response.json();
    let upload_url = body["uploadUrl"].as_str().unwrap();
    let path = upload_url.strip_prefix("http://localhost").unwrap();

    app.client()
        .put(path)
        .bytes(bytes::Bytes::from_static(b"%PDF-1.4\n"))
        .await
        .assert_status_ok();

    let fetched = app.client().get(path).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.as_bytes().as_ref(), b"%PDF-1.4\n");
}

#[tokio::test]
async fn test_local_upload_url_is_write_once() {
    let app = setup_test_app().await;
    let file_id = app.request_upload("user-1", "notes.pdf").await;
    let path = format!("/files/{}", app.record(file_id).await.unwrap().storage_key);

    app.client()
        .put(&path)
        .bytes(bytes::Bytes::from_static(b"%PDF-1.4\n"))
        .await
        .assert_status_ok();

    let second = app
        .client()
        .put(&path)
        .bytes(bytes::Bytes::from_static(b"replacement"))
        .await;
    second.assert_status(StatusCode::CONFLICT);
    let body: Value = second.json();
    assert_eq!(body["code"], "CONFLICT");

    let fetched = app.client().get(&path).await;
    assert_eq!(fetched.as_bytes().as_ref(), b"%PDF-1.4\n");
}
