use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client;
use docintake_core::models::WorkItem;
use docintake_core::Config;
use std::time::Duration;

use super::{Delivery, QueueError, QueueResult, WorkQueue};

/// Amazon SQS work queue
#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
    visibility_timeout_seconds: Option<i32>,
}

impl SqsQueue {
    pub fn new(client: Client, queue_url: String, visibility_timeout_seconds: Option<i32>) -> Self {
        Self {
            client,
            queue_url,
            visibility_timeout_seconds,
        }
    }

    /// Build a client from the ambient AWS credential chain.
    pub async fn from_config(config: &Config) -> QueueResult<Self> {
        let queue_url = config
            .sqs_queue_url()
            .map(String::from)
            .ok_or_else(|| QueueError::ConfigError("SQS_QUEUE_URL not configured".to_string()))?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = config.aws_region() {
            loader = loader.region(aws_sdk_sqs::config::Region::new(region.to_string()));
        }
        let shared = loader.load().await;

        tracing::info!(queue_url = %queue_url, "Using SQS work queue");
        Ok(Self::new(
            Client::new(&shared),
            queue_url,
            config.worker.visibility_timeout_seconds,
        ))
    }
}

#[async_trait]
impl WorkQueue for SqsQueue {
    async fn enqueue(&self, item: &WorkItem) -> QueueResult<()> {
        let body = item.to_message_body()?;
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    file_id = %item.file_id,
                    "SQS send failed"
                );
                QueueError::SendFailed(DisplayErrorContext(&e).to_string())
            })?;

        tracing::debug!(
            file_id = %item.file_id,
            message_id = ?output.message_id(),
            "Work item enqueued"
        );
        Ok(())
    }

    async fn receive(&self, max_messages: i32, wait: Duration) -> QueueResult<Vec<Delivery>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait.as_secs() as i32)
            .set_visibility_timeout(self.visibility_timeout_seconds)
            .send()
            .await
            .map_err(|e| QueueError::ReceiveFailed(DisplayErrorContext(&e).to_string()))?;

        let deliveries = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| match message.receipt_handle {
                // A bodiless message still needs acknowledging, so it is handed
                // on with an empty body that the unit of work rejects.
                Some(receipt_handle) => Some(Delivery {
                    receipt_handle,
                    body: message.body.unwrap_or_default(),
                }),
                None => {
                    tracing::warn!(message_id = ?message.message_id, "SQS message without receipt handle");
                    None
                }
            })
            .collect();

        Ok(deliveries)
    }

    async fn acknowledge(&self, receipt_handle: &str) -> QueueResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::AcknowledgeFailed(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
