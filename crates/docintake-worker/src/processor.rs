//! Per-message unit of work.
//!
//! Looks up the record, marks it processing, downloads the object to a
//! private temp file, runs the analysis pipeline and persists the terminal
//! state. The temp file is removed when it goes out of scope on every path.

use docintake_core::models::{DocumentStatus, StatusUpdate, WorkItem};
use docintake_core::AppError;
use docintake_db::DocumentRepository;
use docintake_processing::AnalysisPipeline;
use docintake_storage::Storage;
use std::sync::Arc;
use uuid::Uuid;

/// What happened to a delivered work item. Every outcome is final and the
/// message may be acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    /// The record no longer exists.
    Missing,
    /// The record already reached a terminal state; a redelivered message.
    Duplicate,
}

pub struct DocumentProcessor {
    repository: Arc<dyn DocumentRepository>,
    storage: Arc<dyn Storage>,
    pipeline: AnalysisPipeline,
}

impl DocumentProcessor {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
        pipeline: AnalysisPipeline,
    ) -> Self {
        Self {
            repository,
            storage,
            pipeline,
        }
    }

    /// Process one work item.
    ///
    /// Failures of the document itself are persisted as `failed` and reported
    /// as [`Outcome::Failed`]. An `Err` means the record store could not be
    /// updated and the message should be left for redelivery.
    #[tracing::instrument(skip(self, item), fields(file_id = %item.file_id, user_id = %item.user_id))]
    pub async fn process(&self, item: &WorkItem) -> Result<Outcome, AppError> {
        let Some(record) = self.repository.get(item.file_id).await? else {
            tracing::warn!("Document not found, dropping work item");
            return Ok(Outcome::Missing);
        };

        if record.status.is_terminal() {
            tracing::info!(status = %record.status, "Document already processed, skipping redelivery");
            return Ok(Outcome::Duplicate);
        }

        if let Some(outcome) = self
            .persist(item.file_id, StatusUpdate::MarkProcessing)
            .await?
        {
            return Ok(outcome);
        }

        if record.storage_key != item.s3_location.key {
            tracing::warn!(
                message_key = %item.s3_location.key,
                storage_key = %record.storage_key,
                "Work item key differs from record, using record"
            );
        }

        let start = std::time::Instant::now();
        let update = match self.analyze(&record.storage_key, &record.content_type).await {
            Ok(metadata) => {
                tracing::info!(
                    document_type = %metadata.document_type,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Document processed"
                );
                StatusUpdate::Complete { metadata }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Document processing failed"
                );
                StatusUpdate::Fail {
                    error: e.to_string(),
                }
            }
        };

        let target = update.target();
        match self.persist(item.file_id, update).await? {
            Some(outcome) => Ok(outcome),
            None if target == DocumentStatus::Completed => Ok(Outcome::Completed),
            None => Ok(Outcome::Failed),
        }
    }

    async fn analyze(
        &self,
        storage_key: &str,
        content_type: &str,
    ) -> Result<docintake_core::models::DocumentMetadata, AppError> {
        let temp = tempfile::Builder::new()
            .prefix("docintake-")
            .tempfile()
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;

        let size = self
            .storage
            .download_to_file(storage_key, temp.path())
            .await
            .map_err(|e| AppError::Processing(format!("Download failed: {}", e)))?;
        tracing::debug!(storage_key = %storage_key, size_bytes = size, "Object downloaded");

        self.pipeline.analyze(temp.path(), content_type).await
    }

    /// Apply a lifecycle update. `None` means it was applied; otherwise the
    /// returned outcome explains why processing should stop here.
    async fn persist(
        &self,
        file_id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<Outcome>, AppError> {
        match self.repository.update_status(file_id, update).await {
            Ok(Some(_)) => Ok(None),
            Ok(None) => {
                tracing::warn!("Document deleted while processing");
                Ok(Some(Outcome::Missing))
            }
            Err(AppError::InvalidTransition { from, to }) => {
                // Another delivery of the same message got here first
                tracing::warn!(
                    from = %from,
                    to = %to,
                    "Concurrent processing of the same document, keeping existing state"
                );
                Ok(Some(Outcome::Duplicate))
            }
            Err(e) => Err(e),
        }
    }
}
