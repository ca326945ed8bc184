//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;

#[cfg(feature = "sqs")]
pub use bootstrap::initialize_app;

#[cfg(feature = "sqs")]
mod bootstrap {
    use super::{database, routes};
    use crate::state::{AppState, UrlExpiry};
    use anyhow::{Context, Result};
    use docintake_core::Config;
    use docintake_db::PgDocumentRepository;
    use docintake_storage::create_storage;
    use docintake_worker::SqsQueue;
    use std::sync::Arc;

    /// Connect the record store, object storage and work queue, and build the router.
    pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
        config
            .validate()
            .context("Configuration validation failed")?;
        tracing::info!(
            environment = %config.base.environment,
            storage_backend = %config.storage_backend,
            "Configuration loaded and validated successfully"
        );

        let pool = database::setup_database(config).await?;
        let repository = Arc::new(PgDocumentRepository::new(pool));

        let storage = create_storage(config)
            .await
            .context("Failed to initialize storage")?;
        tracing::info!(
            backend = %storage.backend_type(),
            bucket = storage.bucket(),
            "Storage initialized"
        );

        let queue = Arc::new(
            SqsQueue::from_config(config)
                .await
                .context("Failed to initialize SQS client")?,
        );

        let state = Arc::new(AppState::new(
            repository,
            storage,
            queue,
            UrlExpiry::from(config),
        ));
        let router = routes::setup_routes(config, state.clone())?;

        Ok((state, router))
    }
}
