//! API constants

/// Versioned prefix for every public route
pub const API_PREFIX: &str = "/api/v1";

/// Served OpenAPI document
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Route the local storage backend's URLs point at
pub const LOCAL_FILES_PATH: &str = "/files";

/// Timeout applied to each dependency probe in the health check
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Upper bound on request bodies; only the local file route carries file bytes
pub const MAX_REQUEST_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Server-wide cap on in-flight requests
pub const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
