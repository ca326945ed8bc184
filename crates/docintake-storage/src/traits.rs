//! Storage abstraction trait
//!
//! The coordinator never proxies file bytes: clients write and read through
//! short-lived presigned URLs, and workers pull the object into a local file.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Failed to sign URL: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for docintake_core::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                docintake_core::AppError::NotFound(format!("Object not found: {}", key))
            }
            StorageError::InvalidKey(msg) => docintake_core::AppError::InvalidInput(msg),
            other => docintake_core::AppError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Object store client used by the coordinator and the workers.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket name recorded in queue messages.
    fn bucket(&self) -> &str;

    fn backend_type(&self) -> StorageBackend;

    /// Generate a presigned PUT URL the client uploads the object to.
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Generate a presigned GET URL for reading the object.
    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Write data directly to `storage_key`.
    ///
    /// Only used by backends that serve their own upload URLs.
    async fn upload_with_key(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Stream the object into `destination`, returning the number of bytes written.
    async fn download_to_file(&self, storage_key: &str, destination: &Path)
        -> StorageResult<u64>;

    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
