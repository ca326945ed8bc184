//! Upload coordinator and completion notifier
//!
//! The coordinator creates the `pending` record and hands out a presigned
//! write URL; the notifier turns a finished upload into a queued work item.
//! Neither ever leaves a record in a state with no path forward: a record
//! only exists while a write URL is outstanding, and it only becomes
//! `processing` once a work item is durably queued.

use chrono::Utc;
use docintake_core::models::{
    CompleteUploadResponse, DocumentRecord, DocumentStatus, StatusUpdate, UploadRequest,
    UploadResponse, WorkItem,
};
use docintake_core::AppError;
use docintake_db::DocumentRepository;
use docintake_storage::{generate_storage_key, Storage};
use docintake_worker::WorkQueue;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

pub const UPLOAD_METHOD: &str = "PUT";

#[derive(Clone)]
pub struct UploadService {
    repository: Arc<dyn DocumentRepository>,
    storage: Arc<dyn Storage>,
    queue: Arc<dyn WorkQueue>,
    upload_url_expiry: Duration,
}

impl UploadService {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
        queue: Arc<dyn WorkQueue>,
        upload_url_expiry: Duration,
    ) -> Self {
        Self {
            repository,
            storage,
            queue,
            upload_url_expiry,
        }
    }

    /// Validate the request, persist a `pending` record and issue a write URL.
    ///
    /// Invalid requests are rejected before any record or URL exists. If the
    /// URL cannot be issued the record is removed again.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, content_type = %request.content_type))]
    pub async fn request_upload(&self, request: UploadRequest) -> Result<UploadResponse, AppError> {
        request.validate()?;

        let file_id = Uuid::new_v4();
        let created_at = Utc::now();
        let storage_key =
            generate_storage_key(&request.user_id, file_id, &request.file_name, created_at);

        let mut record = DocumentRecord::new_pending(
            file_id,
            request.user_id,
            request.file_name,
            request.content_type,
            request.file_size_bytes,
            storage_key.clone(),
        );
        record.created_at = created_at;
        self.repository.create(&record).await?;

        let upload_url = match self
            .storage
            .presigned_put_url(&storage_key, &record.content_type, self.upload_url_expiry)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(file_id = %file_id, error = %e, "Failed to issue upload URL, removing record");
                if let Err(cleanup) = self.repository.delete(file_id).await {
                    tracing::error!(file_id = %file_id, error = %cleanup, "Failed to remove record after URL failure");
                }
                return Err(AppError::StorageUnavailable(e.to_string()));
            }
        };

        tracing::info!(file_id = %file_id, storage_key = %storage_key, "Upload URL issued");

        Ok(UploadResponse {
            file_id,
            upload_url,
            upload_method: UPLOAD_METHOD.to_string(),
            expires_in: self.upload_url_expiry.as_secs(),
            storage_key,
        })
    }

    /// Queue a finished upload for processing.
    ///
    /// Only `pending` records are accepted. The record moves to `processing`
    /// after the enqueue succeeds; a failed enqueue leaves it untouched.
    #[tracing::instrument(skip(self))]
    pub async fn complete_upload(&self, file_id: Uuid) -> Result<CompleteUploadResponse, AppError> {
        let record = self
            .repository
            .get(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;

        if record.status != DocumentStatus::Pending {
            return Err(AppError::InvalidTransition {
                from: record.status,
                to: DocumentStatus::Processing,
            });
        }

        let item = WorkItem::for_record(&record, self.storage.bucket());
        self.queue.enqueue(&item).await?;

        let status = match self
            .repository
            .update_status(file_id, StatusUpdate::MarkProcessing)
            .await
        {
            Ok(Some(updated)) => updated.status,
            Ok(None) => {
                return Err(AppError::NotFound(format!("File {} not found", file_id)));
            }
            Err(AppError::InvalidTransition { from, .. }) => {
                // A worker picked the item up and finished before we got here
                tracing::warn!(file_id = %file_id, status = %from, "Record advanced before completion was recorded");
                from
            }
            Err(e) => return Err(e),
        };

        tracing::info!(file_id = %file_id, user_id = %record.user_id, "Upload queued for processing");

        Ok(CompleteUploadResponse {
            file_id,
            status,
            message: "File queued for processing.".to_string(),
        })
    }
}
