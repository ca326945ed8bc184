//! Runtime wiring for the worker binary

use anyhow::{Context, Result};
use docintake_core::Config;
use docintake_processing::{
    AnalysisPipeline, ExtractorRegistry, LlmClassifier, LlmMetadataExtractor, TextGenerator,
};
use docintake_services::AnthropicService;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Connection pool sized for the worker pool. Migrations are owned by the API.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        workers = config.worker.threads,
        "Database connected successfully"
    );
    Ok(pool)
}

/// Text generation backend, if one is configured.
pub fn text_generator(config: &Config) -> Result<Option<Arc<dyn TextGenerator>>> {
    let Some(api_key) = config.anthropic_api_key.clone() else {
        tracing::warn!("ANTHROPIC_API_KEY not set, every document will use the fallback label");
        return Ok(None);
    };
    let service = AnthropicService::new(api_key, config.anthropic_model.clone())
        .context("Failed to create Anthropic client")?;
    tracing::info!(model = %service.model(), "Anthropic text generation enabled");
    Ok(Some(Arc::new(service)))
}

pub fn build_pipeline(config: &Config) -> Result<AnalysisPipeline> {
    let generator = text_generator(config)?;
    let registry = ExtractorRegistry::with_defaults(config.tesseract_path.clone());
    Ok(AnalysisPipeline::new(
        registry,
        Arc::new(LlmClassifier::new(generator.clone())),
        Arc::new(LlmMetadataExtractor::new(generator)),
    ))
}
