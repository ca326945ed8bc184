//! Docintake API Library
//!
//! HTTP surface of the ingestion pipeline: the upload coordinator, the
//! completion notifier and the read-side document endpoints.

mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::HttpAppError;
pub use setup::routes::{build_router, RouterOptions};
pub use state::{AppState, UrlExpiry};
