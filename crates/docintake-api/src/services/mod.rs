//! Application services behind the HTTP handlers

pub mod documents;
pub mod upload;

pub use documents::{DocumentService, DownloadExpiry};
pub use upload::UploadService;
