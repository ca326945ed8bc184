//! HTTP error response body
//!
//! The `IntoResponse` conversion for `AppError` lives in the API crate; the
//! orphan rule keeps it out of here.

use serde::Serialize;
use utoipa::ToSchema;

/// JSON body returned for every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable code, e.g. `INVALID_STATE_TRANSITION`
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}
