use async_trait::async_trait;
use chrono::Utc;
use docintake_core::models::{DocumentRecord, StatusUpdate};
use docintake_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DocumentRepository;

/// Document repository kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryDocumentRepository {
    records: Arc<RwLock<HashMap<Uuid, DocumentRecord>>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, record: &DocumentRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.file_id) {
            return Err(AppError::InvalidInput(format!(
                "Document {} already exists",
                record.file_id
            )));
        }
        records.insert(record.file_id, record.clone());
        Ok(())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        Ok(self.records.read().await.get(&file_id).cloned())
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        let records = self.records.read().await;
        let mut matching: Vec<DocumentRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn update_status(
        &self,
        file_id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<DocumentRecord>, AppError> {
        let mut records = self.records.write().await;
        let Some(current) = records.get(&file_id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        updated.apply(update, Utc::now())?;
        records.insert(file_id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, file_id: Uuid) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(&file_id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use docintake_core::models::DocumentStatus;

    fn record(user: &str) -> DocumentRecord {
        DocumentRecord::new_pending(
            Uuid::new_v4(),
            user,
            "notes.csv",
            "text/csv",
            42,
            format!("uploads/{}/2024/01/01/{}.csv", user, Uuid::new_v4()),
        )
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let repo = InMemoryDocumentRepository::new();
        let rec = record("u1");
        repo.create(&rec).await.unwrap();
        assert_eq!(repo.get(rec.file_id).await.unwrap(), Some(rec.clone()));
        assert!(repo.create(&rec).await.is_err());

        assert!(repo.delete(rec.file_id).await.unwrap());
        assert!(!repo.delete(rec.file_id).await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_status_missing_record() {
        let repo = InMemoryDocumentRepository::new();
        let result = repo
            .update_status(Uuid::new_v4(), StatusUpdate::MarkProcessing)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_status_rejects_illegal_transition() {
        let repo = InMemoryDocumentRepository::new();
        let rec = record("u1");
        repo.create(&rec).await.unwrap();

        let err = repo
            .update_status(
                rec.file_id,
                StatusUpdate::Fail {
                    error: "boom".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        let stored = repo.get(rec.file_id).await.unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Pending);
        assert!(stored.error.is_none());
    }

    #[tokio::test]
    async fn test_list_by_user_newest_first_with_limit() {
        let repo = InMemoryDocumentRepository::new();
        let base = Utc::now();
        for i in 0..4 {
            let mut rec = record("u1");
            rec.created_at = base + Duration::seconds(i);
            repo.create(&rec).await.unwrap();
        }
        repo.create(&record("someone-else")).await.unwrap();

        let listed = repo.list_by_user("u1", 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(listed[0].created_at, base + Duration::seconds(3));
    }
}
