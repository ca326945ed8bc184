use async_trait::async_trait;
use docintake_core::models::{DocumentLabel, ExtractedMetadata};
use std::sync::Arc;

use crate::llm::TextGenerator;
use crate::prompts::metadata_prompt;

/// Produces the schema-specific record for a classified document.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Errors are service failures. Malformed output is not an error and
    /// yields an empty record of the label's shape.
    async fn extract_structured(
        &self,
        label: DocumentLabel,
        text: &str,
        page_count: Option<u32>,
    ) -> anyhow::Result<ExtractedMetadata>;
}

/// Metadata extractor backed by a text generation model.
#[derive(Clone)]
pub struct LlmMetadataExtractor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl LlmMetadataExtractor {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl MetadataExtractor for LlmMetadataExtractor {
    async fn extract_structured(
        &self,
        label: DocumentLabel,
        text: &str,
        page_count: Option<u32>,
    ) -> anyhow::Result<ExtractedMetadata> {
        if label.is_fallback() {
            return Ok(ExtractedMetadata::fallback(text));
        }
        let Some(generator) = &self.generator else {
            return Ok(ExtractedMetadata::empty(label));
        };

        let response = generator
            .generate(&metadata_prompt(label, text, page_count))
            .await?;

        Ok(parse_response(label, &response))
    }
}

/// Parse model output for `label`, tolerating fenced code blocks.
pub fn parse_response(label: DocumentLabel, response: &str) -> ExtractedMetadata {
    let body = strip_code_fence(response);
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => ExtractedMetadata::from_loose_json(label, value),
        Err(e) => {
            tracing::warn!(label = %label, error = %e, "Metadata response is not JSON");
            ExtractedMetadata::empty(label)
        }
    }
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed.trim_matches('`').trim();
    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => inner[4..].trim(),
        _ => inner,
    }
}
