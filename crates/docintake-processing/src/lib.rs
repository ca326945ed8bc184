//! Docintake content analysis
//!
//! Turns a downloaded file into structured metadata: text extraction by
//! content type, classification into the document taxonomy, and
//! per-type metadata extraction through a text generation service.

pub mod classify;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod structured;

pub use classify::{Classifier, LlmClassifier};
pub use extract::{ContentExtractor, ExtractedContent, ExtractionError, ExtractorRegistry};
pub use llm::TextGenerator;
pub use pipeline::AnalysisPipeline;
pub use structured::{LlmMetadataExtractor, MetadataExtractor};
