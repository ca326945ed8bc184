//! OpenAPI documentation, served at `crate::constants::OPENAPI_PATH`.

use utoipa::OpenApi;

use crate::handlers;
use docintake_core::models;
use docintake_infra::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docintake API",
        version = "0.1.0",
        description = "Document ingestion: presigned uploads, asynchronous classification and metadata extraction, status tracking. All endpoints are versioned under /api/v1/."
    ),
    paths(
        handlers::uploads::request_upload,
        handlers::uploads::complete_upload,
        handlers::documents::get_status,
        handlers::documents::retry,
        handlers::documents::history,
        handlers::documents::download,
        handlers::documents::delete_document,
    ),
    components(schemas(
        models::UploadRequest,
        models::UploadResponse,
        models::CompleteUploadRequest,
        models::CompleteUploadResponse,
        models::StatusResponse,
        models::RetryResponse,
        models::HistoryEntry,
        models::DownloadResponse,
        models::DocumentStatus,
        ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Upload coordination and document lifecycle")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let spec = ApiDoc::openapi();
        for path in [
            "/api/v1/uploads/request",
            "/api/v1/uploads/complete",
            "/api/v1/uploads/{file_id}/status",
            "/api/v1/uploads/{file_id}/retry",
            "/api/v1/uploads/user/{user_id}/history",
            "/api/v1/uploads/{file_id}/download",
            "/api/v1/uploads/{file_id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
