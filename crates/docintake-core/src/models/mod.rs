//! Data models for the ingestion pipeline

mod document;
mod metadata;
mod upload;
mod work_item;

pub use document::*;
pub use metadata::*;
pub use upload::*;
pub use work_item::*;
