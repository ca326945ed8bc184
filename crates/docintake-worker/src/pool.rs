//! Worker pool
//!
//! `workers` poller tasks long-poll the shared queue. A pool-wide semaphore
//! caps in-flight units at `workers` so the record store pool never has more
//! writers than connections. Pollers reserve permits before receiving and
//! never ask for more messages than they hold permits for, so a leased
//! message starts at once and its visibility timeout only has to cover
//! processing time. The visibility timeout is the only recovery path for a
//! unit that dies before acknowledging.

use docintake_core::models::WorkItem;
use docintake_core::WorkerConfig;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::processor::{DocumentProcessor, Outcome};
use crate::queue::{Delivery, WorkQueue};

const MAX_RECEIVE_BACKOFF_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub workers: usize,
    pub max_messages: i32,
    pub wait_time: Duration,
}

impl From<&WorkerConfig> for PoolConfig {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            workers: config.threads.max(1),
            max_messages: config.max_messages,
            wait_time: Duration::from_secs(config.wait_time_seconds.max(0) as u64),
        }
    }
}

/// What became of a delivery after its unit of work ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Deleted from the queue.
    Acknowledged,
    /// Left leased; redelivered once the visibility timeout lapses.
    Retained,
}

/// Capped exponential backoff after consecutive receive failures.
pub fn compute_receive_backoff(consecutive_failures: u32) -> Duration {
    let exp = consecutive_failures.saturating_sub(1).min(6);
    Duration::from_secs(2_u64.pow(exp).min(MAX_RECEIVE_BACKOFF_SECS))
}

#[derive(Clone)]
pub struct WorkerPool {
    queue: Arc<dyn WorkQueue>,
    processor: Arc<DocumentProcessor>,
    config: PoolConfig,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(
        queue: Arc<dyn WorkQueue>,
        processor: Arc<DocumentProcessor>,
        config: PoolConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.workers.max(1)));
        Self {
            queue,
            processor,
            config,
            permits,
        }
    }

    /// Run until `shutdown` is cancelled. Pollers stop receiving immediately;
    /// units already running are allowed to finish.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(
            workers = self.config.workers,
            max_messages = self.config.max_messages,
            wait_time_secs = self.config.wait_time.as_secs(),
            "Worker pool started"
        );

        let mut pollers = JoinSet::new();
        for worker_id in 0..self.config.workers {
            let pool = self.clone();
            let token = shutdown.clone();
            pollers.spawn(async move { pool.poll_loop(worker_id, token).await });
        }

        while let Some(result) = pollers.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker poller terminated abnormally");
            }
        }

        tracing::info!("Worker pool stopped");
    }

    async fn poll_loop(&self, worker_id: usize, shutdown: CancellationToken) {
        let mut consecutive_failures = 0u32;

        loop {
            let permits = tokio::select! {
                _ = shutdown.cancelled() => break,
                permits = self.reserve_permits() => permits,
            };
            let Some(permits) = permits else { break };

            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.queue.receive(permits.len() as i32, self.config.wait_time) => result,
            };

            match received {
                Ok(deliveries) => {
                    consecutive_failures = 0;
                    if deliveries.is_empty() {
                        continue;
                    }
                    tracing::debug!(
                        worker_id,
                        count = deliveries.len(),
                        reserved = permits.len(),
                        "Received messages"
                    );
                    self.dispatch_batch(worker_id, deliveries, permits).await;
                }
                Err(e) => {
                    drop(permits);
                    consecutive_failures += 1;
                    let backoff = compute_receive_backoff(consecutive_failures);
                    tracing::warn!(
                        worker_id,
                        error = %e,
                        consecutive_failures,
                        backoff_secs = backoff.as_secs(),
                        "Queue receive failed, backing off"
                    );
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        tracing::info!(worker_id, "Worker poller stopped");
    }

    /// Wait for one free slot, then take as many more as are free right now,
    /// up to `max_messages`. `None` only if the semaphore was closed.
    async fn reserve_permits(&self) -> Option<Vec<OwnedSemaphorePermit>> {
        let limit = self.config.max_messages.max(1) as usize;
        let first = self.permits.clone().acquire_owned().await.ok()?;
        let mut permits = vec![first];
        while permits.len() < limit {
            match self.permits.clone().try_acquire_owned() {
                Ok(permit) => permits.push(permit),
                Err(_) => break,
            }
        }
        Some(permits)
    }

    /// Run each delivery on its own reserved permit. Permits left over when
    /// fewer messages arrived than were asked for are released here.
    async fn dispatch_batch(
        &self,
        worker_id: usize,
        deliveries: Vec<Delivery>,
        permits: Vec<OwnedSemaphorePermit>,
    ) {
        let mut units = JoinSet::new();
        for (delivery, permit) in deliveries.into_iter().zip(permits) {
            let queue = self.queue.clone();
            let processor = self.processor.clone();
            units.spawn(async move {
                let _permit = permit;
                handle_delivery(queue.as_ref(), &processor, delivery).await
            });
        }

        while let Some(result) = units.join_next().await {
            if let Err(e) = result {
                tracing::error!(worker_id, error = %e, "Unit of work task failed to join");
            }
        }
    }
}

/// Run one delivery to completion and acknowledge it if it reached a final
/// outcome. Never panics: a panic inside the unit of work is caught, logged
/// and leaves the message leased.
#[tracing::instrument(skip_all, fields(receipt = %delivery.receipt_handle))]
pub async fn handle_delivery(
    queue: &dyn WorkQueue,
    processor: &DocumentProcessor,
    delivery: Delivery,
) -> Disposition {
    let item = match WorkItem::from_message_body(&delivery.body) {
        Ok(item) => item,
        Err(e) => {
            // A malformed body can never succeed; drop it instead of looping
            tracing::error!(error = %e, body = %delivery.body, "Discarding unparsable work item");
            return acknowledge(queue, &delivery).await;
        }
    };

    match AssertUnwindSafe(processor.process(&item))
        .catch_unwind()
        .await
    {
        Ok(Ok(outcome)) => {
            match outcome {
                Outcome::Completed | Outcome::Failed => {
                    tracing::info!(file_id = %item.file_id, outcome = ?outcome, "Work item finished")
                }
                Outcome::Missing | Outcome::Duplicate => {
                    tracing::debug!(file_id = %item.file_id, outcome = ?outcome, "Work item dropped")
                }
            }
            acknowledge(queue, &delivery).await
        }
        Ok(Err(e)) => {
            tracing::error!(
                file_id = %item.file_id,
                error = %e,
                "Could not persist work item outcome, leaving message for redelivery"
            );
            Disposition::Retained
        }
        Err(panic) => {
            tracing::error!(
                file_id = %item.file_id,
                panic = %panic_message(panic.as_ref()),
                "Unit of work panicked, leaving message for redelivery"
            );
            Disposition::Retained
        }
    }
}

async fn acknowledge(queue: &dyn WorkQueue, delivery: &Delivery) -> Disposition {
    match queue.acknowledge(&delivery.receipt_handle).await {
        Ok(()) => Disposition::Acknowledged,
        Err(e) => {
            tracing::warn!(error = %e, "Acknowledge failed, message will be redelivered");
            Disposition::Retained
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_backoff_is_capped() {
        assert_eq!(compute_receive_backoff(1), Duration::from_secs(1));
        assert_eq!(compute_receive_backoff(2), Duration::from_secs(2));
        assert_eq!(compute_receive_backoff(4), Duration::from_secs(8));
        assert_eq!(compute_receive_backoff(50), Duration::from_secs(60));
    }

    #[test]
    fn test_pool_config_from_worker_config() {
        let config = PoolConfig::from(&WorkerConfig {
            threads: 0,
            max_messages: 10,
            wait_time_seconds: 20,
            visibility_timeout_seconds: None,
        });
        assert_eq!(config.workers, 1);
        assert_eq!(config.wait_time, Duration::from_secs(20));
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
    }
}
