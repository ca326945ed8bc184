use anyhow::{Context, Result};
use docintake_core::Config;
use docintake_db::PgDocumentRepository;
use docintake_infra::{init_telemetry, shutdown_signal, LogFormat};
use docintake_storage::create_storage;
use docintake_worker::setup::{build_pipeline, setup_database};
use docintake_worker::{DocumentProcessor, PoolConfig, SqsQueue, WorkerPool};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_telemetry(
        "docintake-worker",
        LogFormat::for_environment(config.is_production()),
    )?;

    config
        .validate()
        .context("Configuration validation failed")?;

    let pool = setup_database(&config).await?;
    let repository = Arc::new(PgDocumentRepository::new(pool));
    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    let queue = Arc::new(
        SqsQueue::from_config(&config)
            .await
            .context("Failed to initialize SQS client")?,
    );
    let pipeline = build_pipeline(&config)?;

    let processor = Arc::new(DocumentProcessor::new(repository, storage, pipeline));
    let worker_pool = WorkerPool::new(queue, processor, PoolConfig::from(&config.worker));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    worker_pool.run(shutdown).await;
    Ok(())
}
