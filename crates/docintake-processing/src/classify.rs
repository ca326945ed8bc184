use async_trait::async_trait;
use docintake_core::constants::{truncate_chars, CLASSIFIER_SNIPPET_CHARS};
use docintake_core::models::DocumentLabel;
use std::sync::Arc;

use crate::llm::TextGenerator;
use crate::prompts::classification_prompt;

/// Assigns one taxonomy label to extracted text.
///
/// Never fails: anything that prevents a confident answer yields
/// [`DocumentLabel::Unsupported`].
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> DocumentLabel;
}

/// Classifier backed by a text generation model.
///
/// Without a generator the service counts as unavailable and every document
/// gets the fallback label.
#[derive(Clone)]
pub struct LlmClassifier {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl LlmClassifier {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, text: &str) -> DocumentLabel {
        let snippet = truncate_chars(text, CLASSIFIER_SNIPPET_CHARS);
        if snippet.trim().is_empty() {
            return DocumentLabel::Unsupported;
        }
        let Some(generator) = &self.generator else {
            tracing::debug!("No classification service configured");
            return DocumentLabel::Unsupported;
        };

        match generator.generate(&classification_prompt(snippet)).await {
            Ok(response) => parse_label(&response),
            Err(e) => {
                tracing::warn!(error = %e, "Classification service unavailable");
                DocumentLabel::Unsupported
            }
        }
    }
}

/// Exact match on the trimmed, unquoted response. The fallback label itself
/// is a valid answer.
pub fn parse_label(response: &str) -> DocumentLabel {
    let cleaned = response.replace('"', "");
    match cleaned.trim().parse::<DocumentLabel>() {
        Ok(label) => label,
        Err(_) => {
            tracing::debug!(response = %cleaned.trim(), "Unrecognized classification");
            DocumentLabel::Unsupported
        }
    }
}
