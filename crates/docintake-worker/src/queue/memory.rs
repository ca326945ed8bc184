use async_trait::async_trait;
use docintake_core::models::WorkItem;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use super::{Delivery, QueueResult, WorkQueue};

const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

struct StoredMessage {
    id: u64,
    body: String,
    visible_at: Instant,
    receipt_handle: Option<String>,
    receive_count: u32,
}

#[derive(Default)]
struct QueueState {
    messages: VecDeque<StoredMessage>,
    next_id: u64,
}

/// Process-local queue with visibility timeouts.
///
/// Mirrors SQS lease semantics closely enough for tests and single-process
/// development: received messages are hidden until acknowledged or until the
/// visibility timeout expires.
#[derive(Clone)]
pub struct InMemoryQueue {
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
    visibility_timeout: Duration,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_TIMEOUT)
    }
}

impl InMemoryQueue {
    pub fn new(visibility_timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            notify: Arc::new(Notify::new()),
            visibility_timeout,
        }
    }

    /// Messages not yet acknowledged, leased or not.
    pub async fn len(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Bodies of all unacknowledged messages in queue order.
    pub async fn bodies(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .messages
            .iter()
            .map(|m| m.body.clone())
            .collect()
    }

    /// Decoded unacknowledged work items; undecodable bodies are skipped.
    pub async fn items(&self) -> Vec<WorkItem> {
        self.bodies()
            .await
            .iter()
            .filter_map(|body| WorkItem::from_message_body(body).ok())
            .collect()
    }

    /// Push a raw body, bypassing encoding.
    pub async fn push_raw(&self, body: impl Into<String>) {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;
        state.messages.push_back(StoredMessage {
            id,
            body: body.into(),
            visible_at: Instant::now(),
            receipt_handle: None,
            receive_count: 0,
        });
        drop(state);
        self.notify.notify_waiters();
    }

    /// Lease visible messages, returning the earliest future visibility if none are ready.
    async fn try_lease(&self, max_messages: usize) -> (Vec<Delivery>, Option<Instant>) {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let mut leased = Vec::new();
        let mut next_visible: Option<Instant> = None;

        for message in state.messages.iter_mut() {
            if message.visible_at <= now {
                if leased.len() >= max_messages {
                    break;
                }
                message.receive_count += 1;
                let receipt = format!("{}-{}", message.id, message.receive_count);
                message.receipt_handle = Some(receipt.clone());
                message.visible_at = now + self.visibility_timeout;
                leased.push(Delivery {
                    receipt_handle: receipt,
                    body: message.body.clone(),
                });
            } else {
                next_visible = Some(match next_visible {
                    Some(t) => t.min(message.visible_at),
                    None => message.visible_at,
                });
            }
        }

        (leased, next_visible)
    }
}

#[async_trait]
impl WorkQueue for InMemoryQueue {
    async fn enqueue(&self, item: &WorkItem) -> QueueResult<()> {
        let body = item.to_message_body()?;
        self.push_raw(body).await;
        Ok(())
    }

    async fn receive(&self, max_messages: i32, wait: Duration) -> QueueResult<Vec<Delivery>> {
        let max_messages = max_messages.max(1) as usize;
        let deadline = Instant::now() + wait;

        loop {
            let notified = self.notify.notified();
            let (leased, next_visible) = self.try_lease(max_messages).await;
            if !leased.is_empty() {
                return Ok(leased);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Vec::new());
            }
            let wake_at = next_visible.map_or(deadline, |t| t.min(deadline));
            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    async fn acknowledge(&self, receipt_handle: &str) -> QueueResult<()> {
        let mut state = self.state.lock().await;
        let before = state.messages.len();
        state
            .messages
            .retain(|m| m.receipt_handle.as_deref() != Some(receipt_handle));
        if state.messages.len() == before {
            tracing::debug!(receipt_handle = %receipt_handle, "Acknowledge for unknown or stale lease");
        }
        Ok(())
    }
}
