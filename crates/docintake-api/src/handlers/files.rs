//! Object routes backing the local storage backend's URLs.
//!
//! Mounted only when `STORAGE_BACKEND=local`; with S3 the client talks to
//! the bucket directly.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use docintake_core::AppError;
use std::sync::Arc;

/// Objects are write-once: a second PUT to the same key is refused.
pub async fn put_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    if state.storage.exists(&key).await? {
        return Err(AppError::Conflict(format!("Object {} already uploaded", key)).into());
    }
    state.storage.upload_with_key(&key, body.to_vec()).await?;
    Ok(StatusCode::OK)
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let temp = tempfile::NamedTempFile::new()
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;
    state.storage.download_to_file(&key, temp.path()).await?;
    let data = tokio::fs::read(temp.path()).await.map_err(AppError::from)?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data,
    ))
}
