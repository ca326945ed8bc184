//! Read and maintenance operations on existing documents

use docintake_core::constants::HISTORY_LIMIT;
use docintake_core::models::{
    DocumentRecord, DocumentStatus, DownloadResponse, HistoryEntry, RetryResponse,
    StatusResponse, StatusUpdate, WorkItem,
};
use docintake_core::AppError;
use docintake_db::DocumentRepository;
use docintake_storage::Storage;
use docintake_worker::WorkQueue;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Lifetimes of the read URLs this service hands out
#[derive(Debug, Clone, Copy)]
pub struct DownloadExpiry {
    /// Attached to status responses of completed documents
    pub status: Duration,
    /// Returned by the explicit download operation
    pub download: Duration,
}

#[derive(Clone)]
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
    storage: Arc<dyn Storage>,
    queue: Arc<dyn WorkQueue>,
    expiry: DownloadExpiry,
}

impl DocumentService {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
        queue: Arc<dyn WorkQueue>,
        expiry: DownloadExpiry,
    ) -> Self {
        Self {
            repository,
            storage,
            queue,
            expiry,
        }
    }

    async fn find(&self, file_id: Uuid) -> Result<DocumentRecord, AppError> {
        self.repository
            .get(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))
    }

    /// Current lifecycle state. Completed documents carry a read URL; a
    /// signing failure leaves it `null` instead of failing the query.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self, file_id: Uuid) -> Result<StatusResponse, AppError> {
        let record = self.find(file_id).await?;

        let download_url = if record.status == DocumentStatus::Completed {
            match self
                .storage
                .presigned_get_url(&record.storage_key, self.expiry.status)
                .await
            {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(file_id = %file_id, error = %e, "Failed to sign download URL for status");
                    None
                }
            }
        } else {
            None
        };

        Ok(StatusResponse::from_record(record, download_url))
    }

    /// Put a `failed` (or still `pending`) document back on the queue.
    ///
    /// The record is reset first so a fast worker always finds it
    /// `pending`. If the enqueue then fails the record stays `pending` with
    /// no message behind it; nothing will pick it up until the caller
    /// repeats the retry.
    #[tracing::instrument(skip(self))]
    pub async fn retry(&self, file_id: Uuid) -> Result<RetryResponse, AppError> {
        let record = self
            .repository
            .update_status(file_id, StatusUpdate::ResetForRetry)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;

        let item = WorkItem::for_record(&record, self.storage.bucket());
        if let Err(e) = self.queue.enqueue(&item).await {
            tracing::error!(
                file_id = %file_id,
                error = %e,
                retry_required = true,
                "Retry enqueue failed, record left pending until retried again"
            );
            return Err(e.into());
        }

        tracing::info!(file_id = %file_id, user_id = %record.user_id, "Document re-queued");

        Ok(RetryResponse {
            file_id,
            status: record.status,
            message: "File re-queued for processing.".to_string(),
        })
    }

    /// Most recent uploads of a user, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, AppError> {
        let records = self.repository.list_by_user(user_id, HISTORY_LIMIT).await?;
        Ok(records.into_iter().map(HistoryEntry::from).collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn download(&self, file_id: Uuid) -> Result<DownloadResponse, AppError> {
        let record = self.find(file_id).await?;
        let download_url = self
            .storage
            .presigned_get_url(&record.storage_key, self.expiry.download)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

        Ok(DownloadResponse {
            download_url,
            expires_in: self.expiry.download.as_secs(),
        })
    }

    /// Remove the stored object, then the record.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, file_id: Uuid) -> Result<(), AppError> {
        let record = self.find(file_id).await?;
        self.storage.delete(&record.storage_key).await?;
        if !self.repository.delete(file_id).await? {
            return Err(AppError::NotFound(format!("File {} not found", file_id)));
        }
        tracing::info!(file_id = %file_id, storage_key = %record.storage_key, "Document deleted");
        Ok(())
    }

    /// Record store reachability for health checks.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}
