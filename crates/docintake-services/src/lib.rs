//! Docintake Services Layer
//!
//! Clients for hosted services the pipeline depends on. Each client
//! implements a capability trait from `docintake-processing` so workers can
//! run against fakes in tests.

pub mod services;

#[cfg(feature = "anthropic")]
pub use services::AnthropicService;
