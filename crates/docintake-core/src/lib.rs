//! Docintake Core Library
//!
//! Domain models, error types, configuration and limits shared by the
//! upload coordinator, the record store and the worker pool.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::{BaseConfig, Config, WorkerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
