//! Docintake Storage Library
//!
//! Object store abstraction used by the upload coordinator (presigned URLs)
//! and by the workers (downloading uploaded objects for extraction).
//!
//! # Storage key format
//!
//! `uploads/{user_id}/{YYYY}/{MM}/{DD}/{file_id}.{extension}`. Key generation
//! lives in the `keys` module so every backend agrees on the layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

pub use docintake_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{extension_from_file_name, generate_storage_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
