use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::document::{DocumentRecord, DocumentStatus};
use super::metadata::DocumentMetadata;
use crate::constants::is_allowed_content_type;

/// Request for a presigned upload URL
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "User ID must be between 1 and 255 characters"
    ))]
    pub user_id: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    #[serde(alias = "fileSize")]
    #[validate(range(min = 1, message = "File size must be at least 1 byte"))]
    pub file_size_bytes: i64,
    #[serde(alias = "fileType")]
    #[validate(custom(function = "validate_content_type"))]
    pub content_type: String,
}

fn validate_content_type(content_type: &str) -> Result<(), ValidationError> {
    if is_allowed_content_type(content_type) {
        Ok(())
    } else {
        let mut err = ValidationError::new("unsupported_content_type");
        err.message = Some(format!("Unsupported file type: {}", content_type).into());
        Err(err)
    }
}

/// Presigned upload details returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: Uuid,
    pub upload_url: String,
    pub upload_method: String,
    /// Seconds until `upload_url` stops accepting writes
    pub expires_in: u64,
    pub storage_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    pub file_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadResponse {
    pub file_id: Uuid,
    pub status: DocumentStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub file_id: Uuid,
    pub status: DocumentStatus,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<DocumentMetadata>,
    /// Presigned read URL, only present once processing has completed
    pub download_url: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn from_record(record: DocumentRecord, download_url: Option<String>) -> Self {
        Self {
            file_id: record.file_id,
            status: record.status,
            message: record.status.message().to_string(),
            last_updated: record.last_updated(),
            metadata: record.metadata,
            download_url,
            error: record.error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetryResponse {
    pub file_id: Uuid,
    pub status: DocumentStatus,
    pub message: String,
}

/// One row of a user's upload history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub file_id: Uuid,
    pub file_name: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl From<DocumentRecord> for HistoryEntry {
    fn from(record: DocumentRecord) -> Self {
        Self {
            file_id: record.file_id,
            file_name: record.file_name,
            status: record.status,
            uploaded_at: record.created_at,
            completed_at: record.completed_at,
            error: record.error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub download_url: String,
    pub expires_in: u64,
}
