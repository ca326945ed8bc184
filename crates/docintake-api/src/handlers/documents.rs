use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use docintake_core::models::{DownloadResponse, HistoryEntry, RetryResponse, StatusResponse};
use docintake_infra::ErrorResponse;
use std::sync::Arc;
use uuid::Uuid;

/// Processing status of a document
#[utoipa::path(
    get,
    path = "/api/v1/uploads/{file_id}/status",
    tag = "uploads",
    params(("file_id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Current status", body = StatusResponse),
        (status = 404, description = "Unknown file", body = ErrorResponse)
    )
)]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.documents.status(file_id).await?))
}

/// Re-queue a failed document
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{file_id}/retry",
    tag = "uploads",
    params(("file_id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 202, description = "Document re-queued", body = RetryResponse),
        (status = 404, description = "Unknown file", body = ErrorResponse),
        (status = 409, description = "Document is processing or completed", body = ErrorResponse),
        (status = 503, description = "Work queue unavailable", body = ErrorResponse)
    )
)]
pub async fn retry(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.documents.retry(file_id).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Recent uploads of a user, newest first
#[utoipa::path(
    get,
    path = "/api/v1/uploads/user/{user_id}/history",
    tag = "uploads",
    params(("user_id" = String, Path, description = "Owner ID")),
    responses(
        (status = 200, description = "Upload history", body = [HistoryEntry])
    )
)]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.documents.history(&user_id).await?))
}

/// Short-lived read URL for the stored object
#[utoipa::path(
    get,
    path = "/api/v1/uploads/{file_id}/download",
    tag = "uploads",
    params(("file_id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Download URL", body = DownloadResponse),
        (status = 404, description = "Unknown file", body = ErrorResponse),
        (status = 503, description = "Object storage unavailable", body = ErrorResponse)
    )
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.documents.download(file_id).await?))
}

/// Delete a document and its stored object
#[utoipa::path(
    delete,
    path = "/api/v1/uploads/{file_id}",
    tag = "uploads",
    params(("file_id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown file", body = ErrorResponse)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.documents.delete(file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
