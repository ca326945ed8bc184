//! Document record store
//!
//! Every lifecycle write goes through [`DocumentRepository::update_status`], which
//! checks the requested transition against the current row atomically. Two
//! implementations are provided: PostgreSQL for deployments and an in-memory
//! map for tests and local tooling.

pub mod document;
pub mod memory;

use async_trait::async_trait;
use docintake_core::models::{DocumentRecord, StatusUpdate};
use docintake_core::AppError;
use uuid::Uuid;

pub use document::PgDocumentRepository;
pub use memory::InMemoryDocumentRepository;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a freshly created record.
    async fn create(&self, record: &DocumentRecord) -> Result<(), AppError>;

    async fn get(&self, file_id: Uuid) -> Result<Option<DocumentRecord>, AppError>;

    /// Most recent records for a user, newest first.
    async fn list_by_user(&self, user_id: &str, limit: i64)
        -> Result<Vec<DocumentRecord>, AppError>;

    /// Apply a lifecycle update.
    ///
    /// Returns `Ok(None)` when the record does not exist and
    /// `Err(AppError::InvalidTransition)` when the current status forbids it.
    async fn update_status(
        &self,
        file_id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<DocumentRecord>, AppError>;

    /// Remove a record. Returns whether a row existed.
    async fn delete(&self, file_id: Uuid) -> Result<bool, AppError>;

    /// Cheap connectivity check used by health endpoints.
    async fn ping(&self) -> Result<(), AppError>;
}
