//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{
    API_PREFIX, HTTP_CONCURRENCY_LIMIT, LOCAL_FILES_PATH, MAX_REQUEST_BODY_BYTES, OPENAPI_PATH,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use docintake_core::{Config, StorageBackend};
use docintake_infra::{request_id_middleware, security_headers_middleware};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Options that shape the router independently of the process configuration,
/// so tests can build it without environment variables.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors_origins: Vec<String>,
    /// Serve object bytes under `/files` for the local storage backend
    pub local_files: bool,
}

impl From<&Config> for RouterOptions {
    fn from(config: &Config) -> Self {
        Self {
            cors_origins: config.cors_origins().to_vec(),
            local_files: config.storage_backend == StorageBackend::Local,
        }
    }
}

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> anyhow::Result<Router> {
    Ok(build_router(state, &RouterOptions::from(config)))
}

pub fn build_router(state: Arc<AppState>, options: &RouterOptions) -> Router {
    let uploads = Router::new()
        .route("/request", post(handlers::uploads::request_upload))
        .route("/complete", post(handlers::uploads::complete_upload))
        .route("/{file_id}/status", get(handlers::documents::get_status))
        .route("/{file_id}/retry", post(handlers::documents::retry))
        .route("/{file_id}/download", get(handlers::documents::download))
        .route("/{file_id}", delete(handlers::documents::delete_document))
        .route("/user/{user_id}/history", get(handlers::documents::history));

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .nest(&format!("{}/uploads", API_PREFIX), uploads);

    if options.local_files {
        tracing::info!(path = LOCAL_FILES_PATH, "Serving local storage objects");
        router = router.route(
            &format!("{}/{{*key}}", LOCAL_FILES_PATH),
            get(handlers::files::get_file).put(handlers::files::put_file),
        );
    }

    router
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(setup_cors(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .with_state(state)
}

fn setup_cors(origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any)
}
