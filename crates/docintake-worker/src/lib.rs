//! Docintake Worker Library
//!
//! Queue clients, the per-message unit of work and the worker pool that
//! drives it. The `docintake-worker` binary wires these to PostgreSQL, the
//! object store and SQS; tests wire them to in-memory fakes.

pub mod pool;
pub mod processor;
pub mod queue;
pub mod setup;

pub use pool::{handle_delivery, Disposition, PoolConfig, WorkerPool};
pub use processor::{DocumentProcessor, Outcome};
pub use queue::{Delivery, InMemoryQueue, QueueError, QueueResult, WorkQueue};
#[cfg(feature = "sqs")]
pub use queue::SqsQueue;
