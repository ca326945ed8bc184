//! Configuration module
//!
//! Settings for the coordinator API and the worker binary are read from the
//! environment (optionally seeded from a `.env` file) and validated once at startup.

use std::env;

use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_URL_EXPIRY_SECS: u64 = 1800;
const STATUS_DOWNLOAD_URL_EXPIRY_SECS: u64 = 1800;
const DOWNLOAD_URL_EXPIRY_SECS: u64 = 600;
const WORKER_THREADS: usize = 5;
const WORKER_MAX_MESSAGES: i32 = 10;
const WORKER_WAIT_TIME_SECS: i32 = 10;
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

/// Settings shared by both binaries
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Worker pool sizing and queue polling
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub threads: usize,
    pub max_messages: i32,
    pub wait_time_seconds: i32,
    pub visibility_timeout_seconds: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub sqs_queue_url: Option<String>,
    pub upload_url_expiry_seconds: u64,
    pub status_download_url_expiry_seconds: u64,
    pub download_url_expiry_seconds: u64,
    pub worker: WorkerConfig,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub tesseract_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .or_else(|_| env::var("DB_POOL_SIZE"))
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::S3,
        };

        let worker = WorkerConfig {
            threads: env::var("WORKER_THREADS")
                .unwrap_or_else(|_| WORKER_THREADS.to_string())
                .parse()
                .unwrap_or(WORKER_THREADS),
            max_messages: env::var("WORKER_MAX_MESSAGES")
                .unwrap_or_else(|_| WORKER_MAX_MESSAGES.to_string())
                .parse()
                .unwrap_or(WORKER_MAX_MESSAGES),
            wait_time_seconds: env::var("WORKER_WAIT_TIME_SECONDS")
                .unwrap_or_else(|_| WORKER_WAIT_TIME_SECS.to_string())
                .parse()
                .unwrap_or(WORKER_WAIT_TIME_SECS),
            visibility_timeout_seconds: env::var("WORKER_VISIBILITY_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok()),
        };

        let s3_region = env::var("S3_REGION").ok();

        Ok(Self {
            base,
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            aws_region: env::var("AWS_REGION").ok().or_else(|| s3_region.clone()),
            s3_region,
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: Some(
                env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./storage".to_string()),
            ),
            local_storage_base_url: Some(
                env::var("LOCAL_STORAGE_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/files".to_string()),
            ),
            sqs_queue_url: env::var("SQS_QUEUE_URL").ok(),
            upload_url_expiry_seconds: env::var("UPLOAD_URL_EXPIRY_SECONDS")
                .unwrap_or_else(|_| UPLOAD_URL_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_URL_EXPIRY_SECS),
            status_download_url_expiry_seconds: env::var("STATUS_DOWNLOAD_URL_EXPIRY_SECONDS")
                .unwrap_or_else(|_| STATUS_DOWNLOAD_URL_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(STATUS_DOWNLOAD_URL_EXPIRY_SECS),
            download_url_expiry_seconds: env::var("DOWNLOAD_URL_EXPIRY_SECONDS")
                .unwrap_or_else(|_| DOWNLOAD_URL_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(DOWNLOAD_URL_EXPIRY_SECS),
            worker,
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string()),
            tesseract_path: env::var("TESSERACT_PATH").unwrap_or_else(|_| "tesseract".to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.sqs_queue_url.is_none() {
            return Err(anyhow::anyhow!("SQS_QUEUE_URL must be set"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.worker.threads == 0 {
            return Err(anyhow::anyhow!("WORKER_THREADS must be at least 1"));
        }

        // Every worker may hold a connection while persisting its result.
        if (self.base.db_max_connections as usize) < self.worker.threads {
            return Err(anyhow::anyhow!(
                "DB_MAX_CONNECTIONS ({}) must be at least WORKER_THREADS ({})",
                self.base.db_max_connections,
                self.worker.threads
            ));
        }

        if !(1..=10).contains(&self.worker.max_messages) {
            return Err(anyhow::anyhow!("WORKER_MAX_MESSAGES must be between 1 and 10"));
        }

        if !(0..=20).contains(&self.worker.wait_time_seconds) {
            return Err(anyhow::anyhow!(
                "WORKER_WAIT_TIME_SECONDS must be between 0 and 20"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(
            self.base.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.base.db_timeout_seconds
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    pub fn sqs_queue_url(&self) -> Option<&str> {
        self.sqs_queue_url.as_deref()
    }
}
