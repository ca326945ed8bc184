//! Application state shared by all handlers

use docintake_core::Config;
use docintake_db::DocumentRepository;
use docintake_storage::Storage;
use docintake_worker::WorkQueue;
use std::sync::Arc;
use std::time::Duration;

use crate::services::{DocumentService, DownloadExpiry, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadService,
    pub documents: DocumentService,
    /// Backing store, used directly by the local file routes.
    pub storage: Arc<dyn Storage>,
}

/// URL lifetimes taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct UrlExpiry {
    pub upload: Duration,
    pub status_download: Duration,
    pub download: Duration,
}

impl From<&Config> for UrlExpiry {
    fn from(config: &Config) -> Self {
        Self {
            upload: Duration::from_secs(config.upload_url_expiry_seconds),
            status_download: Duration::from_secs(config.status_download_url_expiry_seconds),
            download: Duration::from_secs(config.download_url_expiry_seconds),
        }
    }
}

impl AppState {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn Storage>,
        queue: Arc<dyn WorkQueue>,
        expiry: UrlExpiry,
    ) -> Self {
        Self {
            uploads: UploadService::new(
                repository.clone(),
                storage.clone(),
                queue.clone(),
                expiry.upload,
            ),
            documents: DocumentService::new(
                repository,
                storage.clone(),
                queue,
                DownloadExpiry {
                    status: expiry.status_download,
                    download: expiry.download,
                },
            ),
            storage,
        }
    }
}
