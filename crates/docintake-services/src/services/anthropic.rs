//! Anthropic (Claude) text generation.
//!
//! Single-turn calls to the Messages API, used for document classification
//! and structured metadata extraction.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use docintake_processing::TextGenerator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct AnthropicService {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Debug, Serialize)]
struct MessageParam<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockResponse {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    fn into_text(self) -> String {
        self.content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlockResponse::Text { text } => Some(text),
                ContentBlockResponse::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

impl AnthropicService {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            api_key,
            model,
            base_url: ANTHROPIC_API_BASE.to_string(),
            client,
        })
    }

    /// Point the client at a different API host (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url)
    }

    async fn call_messages(&self, prompt: &str) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send Messages API request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Anthropic Messages API failed with status {}: {}",
                status,
                error_text
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Messages API response")?;

        tracing::debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Messages API call completed"
        );

        Ok(parsed.into_text())
    }
}

#[async_trait]
impl TextGenerator for AnthropicService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call_messages(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = MessagesRequest {
            model: "claude-3-5-haiku-latest",
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            messages: vec![MessageParam {
                role: "user",
                content: "Classify this",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "claude-3-5-haiku-latest");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Classify this");
    }

    #[test]
    fn test_response_text_blocks_are_joined() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "type": "message",
                "content": [
                    {"type": "text", "text": "Invo"},
                    {"type": "tool_use", "id": "t", "name": "n", "input": {}},
                    {"type": "text", "text": "ice"}
                ],
                "stop_reason": "end_turn"
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text(), "Invoice");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        let service = AnthropicService::new("key".into(), "model".into())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v1/");
        assert_eq!(service.messages_url(), "http://127.0.0.1:9/v1/messages");
        assert!(service.generate("hello").await.is_err());
    }
}
