//! Docintake Infrastructure Library
//!
//! Shared plumbing for the API and worker binaries: tracing subscriber
//! setup, HTTP middleware and the JSON error body.

#[cfg(feature = "middleware")]
pub mod middleware;

pub mod error;
pub mod signal;
pub mod telemetry;

#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
};

pub use error::ErrorResponse;
pub use signal::shutdown_signal;
pub use telemetry::{init_telemetry, LogFormat};
