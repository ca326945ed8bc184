//! Work queue abstraction
//!
//! Delivery is at-least-once: a received message stays invisible to other
//! consumers until it is acknowledged or its visibility timeout lapses, at
//! which point it is delivered again.

pub mod memory;
#[cfg(feature = "sqs")]
pub mod sqs;

use async_trait::async_trait;
use docintake_core::models::WorkItem;
use docintake_core::AppError;
use std::time::Duration;
use thiserror::Error;

pub use memory::InMemoryQueue;
#[cfg(feature = "sqs")]
pub use sqs::SqsQueue;

/// A leased message.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Opaque lease token, valid until the visibility timeout lapses.
    pub receipt_handle: String,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    #[error("Failed to receive messages: {0}")]
    ReceiveFailed(String),

    #[error("Failed to acknowledge message: {0}")]
    AcknowledgeFailed(String),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Queue configuration error: {0}")]
    ConfigError(String),
}

pub type QueueResult<T> = Result<T, QueueError>;

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Encode(e) => AppError::Serialization(e.to_string()),
            other => AppError::QueueUnavailable(other.to_string()),
        }
    }
}

#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Durably enqueue one work item.
    async fn enqueue(&self, item: &WorkItem) -> QueueResult<()>;

    /// Long-poll for up to `max_messages`, waiting at most `wait`.
    async fn receive(&self, max_messages: i32, wait: Duration) -> QueueResult<Vec<Delivery>>;

    /// Delete a leased message so it is never redelivered.
    async fn acknowledge(&self, receipt_handle: &str) -> QueueResult<()>;
}
