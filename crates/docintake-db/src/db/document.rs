use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docintake_core::models::{DocumentMetadata, DocumentRecord, StatusUpdate};
use docintake_core::AppError;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DocumentRepository;

const SELECT_COLUMNS: &str = r#"
    file_id, user_id, file_name, content_type, file_size_bytes, storage_key,
    status, created_at, completed_at, error, metadata
"#;

#[derive(FromRow)]
struct DocumentRow {
    file_id: Uuid,
    user_id: String,
    file_name: String,
    content_type: String,
    file_size_bytes: i64,
    storage_key: String,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<String>,
    metadata: Option<Json<DocumentMetadata>>,
}

impl TryFrom<DocumentRow> for DocumentRecord {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(DocumentRecord {
            file_id: row.file_id,
            user_id: row.user_id,
            file_name: row.file_name,
            content_type: row.content_type,
            file_size_bytes: row.file_size_bytes,
            storage_key: row.storage_key,
            status: row
                .status
                .parse()
                .map_err(|e: anyhow::Error| AppError::Internal(e.to_string()))?,
            created_at: row.created_at,
            completed_at: row.completed_at,
            error: row.error,
            metadata: row.metadata.map(|Json(m)| m),
        })
    }
}

/// PostgreSQL-backed document repository
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[tracing::instrument(skip(self, record), fields(file_id = %record.file_id))]
    async fn create(&self, record: &DocumentRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO documents (
                file_id, user_id, file_name, content_type, file_size_bytes,
                storage_key, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.file_id)
        .bind(&record.user_id)
        .bind(&record.file_name)
        .bind(&record.content_type)
        .bind(record.file_size_bytes)
        .bind(&record.storage_key)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {} FROM documents WHERE file_id = $1",
            SELECT_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DocumentRecord::try_from).transpose()
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRecord::try_from).collect()
    }

    #[tracing::instrument(skip(self, update), fields(file_id = %file_id, target = %update.target()))]
    async fn update_status(
        &self,
        file_id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<DocumentRecord>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent writers for the same document.
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {} FROM documents WHERE file_id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = DocumentRecord::try_from(row)?;
        record.apply(update, Utc::now())?;

        sqlx::query(
            r#"
            UPDATE documents
            SET status = $2, error = $3, metadata = $4, completed_at = $5, updated_at = NOW()
            WHERE file_id = $1
            "#,
        )
        .bind(file_id)
        .bind(record.status.as_str())
        .bind(record.error.as_deref())
        .bind(record.metadata.as_ref().map(Json))
        .bind(record.completed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(status = %record.status, "Document status updated");
        Ok(Some(record))
    }

    async fn delete(&self, file_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
