use async_trait::async_trait;

/// A hosted text generation model.
///
/// The classifier and the metadata extractor only need prompt in, text out.
/// Implementations report transport and API failures as errors.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
