use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use docintake_core::models::{
    CompleteUploadRequest, CompleteUploadResponse, UploadRequest, UploadResponse,
};
use docintake_infra::ErrorResponse;
use std::sync::Arc;

/// Register an upload and get a presigned PUT URL for it
#[utoipa::path(
    post,
    path = "/api/v1/uploads/request",
    tag = "uploads",
    request_body = UploadRequest,
    responses(
        (status = 201, description = "Record created, upload URL issued", body = UploadResponse),
        (status = 400, description = "Invalid size or content type", body = ErrorResponse),
        (status = 503, description = "Object storage unavailable", body = ErrorResponse)
    )
)]
pub async fn request_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.uploads.request_upload(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Signal that the object has been written and queue it for processing
#[utoipa::path(
    post,
    path = "/api/v1/uploads/complete",
    tag = "uploads",
    request_body = CompleteUploadRequest,
    responses(
        (status = 200, description = "Work item queued", body = CompleteUploadResponse),
        (status = 404, description = "Unknown file", body = ErrorResponse),
        (status = 409, description = "Document is not pending", body = ErrorResponse),
        (status = 503, description = "Work queue unavailable", body = ErrorResponse)
    )
)]
pub async fn complete_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CompleteUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.uploads.complete_upload(request.file_id).await?;
    Ok(Json(response))
}
