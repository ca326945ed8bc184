//! Docintake persistence layer
//!
//! Repository trait and implementations for the per-document lifecycle table.

pub mod db;

pub use db::{DocumentRepository, InMemoryDocumentRepository, PgDocumentRepository};
