//! Test helpers: build the router over in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p docintake-api`.

#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use docintake_api::constants;
use docintake_api::{build_router, AppState, RouterOptions, UrlExpiry};
use docintake_core::models::{DocumentRecord, DocumentStatus, StatusUpdate};
use docintake_db::{DocumentRepository, InMemoryDocumentRepository};
use docintake_storage::LocalStorage;
use fakes::{ScriptedQueue, ScriptedStorage};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

pub const FILES_BASE_URL: &str = "http://localhost/files";
pub const UPLOAD_EXPIRY_SECS: u64 = 900;
pub const DOWNLOAD_EXPIRY_SECS: u64 = 300;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub repository: Arc<InMemoryDocumentRepository>,
    pub storage: Arc<ScriptedStorage>,
    pub queue: Arc<ScriptedQueue>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub async fn record(&self, file_id: Uuid) -> Option<DocumentRecord> {
        self.repository
            .get(file_id)
            .await
            .expect("repository read failed")
    }

    /// Request an upload URL for a small PDF and return the file ID.
    pub async fn request_upload(&self, user_id: &str, file_name: &str) -> Uuid {
        let response = self
            .server
            .post(&api_path("/uploads/request"))
            .json(&upload_body(user_id, file_name))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["fileId"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("response carries a fileId")
    }

    /// Insert a record directly and walk it to `status` through legal moves.
    pub async fn seed(&self, user_id: &str, status: DocumentStatus, age_minutes: i64) -> Uuid {
        let file_id = Uuid::new_v4();
        let mut record = DocumentRecord::new_pending(
            file_id,
            user_id,
            format!("{}.pdf", file_id),
            "application/pdf",
            2048,
            format!("uploads/{}/2024/01/01/{}.pdf", user_id, file_id),
        );
        record.created_at = Utc::now() - ChronoDuration::minutes(age_minutes);
        self.repository.create(&record).await.expect("create failed");

        let steps: &[StatusUpdate] = match status {
            DocumentStatus::Pending => &[],
            DocumentStatus::Processing => &[StatusUpdate::MarkProcessing],
            DocumentStatus::Failed => &[
                StatusUpdate::MarkProcessing,
                StatusUpdate::Fail {
                    error: "Download failed: object missing".into(),
                },
            ],
            DocumentStatus::Completed => &[StatusUpdate::MarkProcessing],
        };
        for step in steps {
            self.repository
                .update_status(file_id, step.clone())
                .await
                .expect("transition failed");
        }
        if status == DocumentStatus::Completed {
            self.repository
                .update_status(
                    file_id,
                    StatusUpdate::Complete {
                        metadata: fixtures_metadata(),
                    },
                )
                .await
                .expect("completion failed");
        }
        file_id
    }
}

pub fn upload_body(user_id: &str, file_name: &str) -> Value {
    json!({
        "userId": user_id,
        "fileName": file_name,
        "fileSizeBytes": 1024,
        "contentType": "application/pdf"
    })
}

pub fn fixtures_metadata() -> docintake_core::models::DocumentMetadata {
    use docintake_core::models::{DocumentMetadata, ExtractedMetadata};
    DocumentMetadata::new(
        ExtractedMetadata::fallback("Quarterly report"),
        "Quarterly report".to_string(),
        Some(1),
        None,
    )
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("temp dir");
    let local = LocalStorage::new(temp_dir.path(), FILES_BASE_URL.to_string())
        .await
        .expect("local storage");

    let repository = Arc::new(InMemoryDocumentRepository::new());
    let storage = Arc::new(ScriptedStorage::new(local));
    let queue = Arc::new(ScriptedQueue::new());

    let state = Arc::new(AppState::new(
        repository.clone(),
        storage.clone(),
        queue.clone(),
        UrlExpiry {
            upload: Duration::from_secs(UPLOAD_EXPIRY_SECS),
            status_download: Duration::from_secs(DOWNLOAD_EXPIRY_SECS),
            download: Duration::from_secs(DOWNLOAD_EXPIRY_SECS),
        },
    ));
    let router = build_router(
        state,
        &RouterOptions {
            cors_origins: vec!["*".to_string()],
            local_files: true,
        },
    );

    TestApp {
        server: TestServer::new(router).expect("test server"),
        repository,
        storage,
        queue,
        _temp_dir: temp_dir,
    }
}
