//! Content extraction by declared content type.
//!
//! Each extractor turns a file on local disk into plain text plus whatever
//! structural facts its format exposes. The registry picks the extractor by
//! content type and caps the text before it reaches classification.

#[cfg(feature = "docx")]
mod docx;
mod image;
#[cfg(feature = "pdf")]
mod pdf;
#[cfg(feature = "csv")]
mod tabular;

#[cfg(feature = "docx")]
pub use self::docx::DocxExtractor;
pub use self::image::TesseractExtractor;
#[cfg(feature = "pdf")]
pub use self::pdf::PdfExtractor;
#[cfg(feature = "csv")]
pub use self::tabular::CsvExtractor;

use async_trait::async_trait;
use docintake_core::constants::{truncate_chars, MAX_EXTRACTED_TEXT_CHARS};
use docintake_core::models::TableShape;
use docintake_core::AppError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Text produced for content types without an extractor.
pub const UNSUPPORTED_FORMAT_TEXT: &str = "Unsupported format";

/// Text and structural facts pulled out of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    pub text: String,
    pub page_count: Option<u32>,
    pub table: Option<TableShape>,
}

impl ExtractedContent {
    pub fn unsupported() -> Self {
        Self {
            text: UNSUPPORTED_FORMAT_TEXT.to_string(),
            ..Default::default()
        }
    }

    /// Cut the text to the downstream character cap.
    pub fn truncated(mut self) -> Self {
        let cut = truncate_chars(&self.text, MAX_EXTRACTED_TEXT_CHARS).len();
        self.text.truncate(cut);
        self
    }
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Extraction failed: {0}")]
    Failed(String),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Processing(err.to_string())
    }
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Content types this extractor handles.
    fn supported_types(&self) -> &[&str];

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractionError>;
}

/// Content type to extractor mapping.
#[derive(Default, Clone)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn ContentExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in extractor enabled at compile time.
    pub fn with_defaults(tesseract_path: impl Into<String>) -> Self {
        let mut registry = Self::new();
        registry.register(TesseractExtractor::new(tesseract_path));
        #[cfg(feature = "pdf")]
        registry.register(PdfExtractor);
        #[cfg(feature = "docx")]
        registry.register(DocxExtractor);
        #[cfg(feature = "csv")]
        registry.register(CsvExtractor);
        registry
    }

    pub fn register<E: ContentExtractor + 'static>(&mut self, extractor: E) {
        let extractor: Arc<dyn ContentExtractor> = Arc::new(extractor);
        for content_type in extractor.supported_types() {
            self.extractors
                .insert((*content_type).to_string(), extractor.clone());
        }
    }

    pub fn supports(&self, content_type: &str) -> bool {
        self.extractors.contains_key(content_type)
    }

    /// Extract and truncate. Unknown content types yield the unsupported marker.
    pub async fn extract(
        &self,
        path: &Path,
        content_type: &str,
    ) -> Result<ExtractedContent, ExtractionError> {
        let Some(extractor) = self.extractors.get(content_type) else {
            tracing::debug!(content_type = %content_type, "No extractor for content type");
            return Ok(ExtractedContent::unsupported());
        };

        let content = extractor.extract(path).await?;
        Ok(content.truncated())
    }
}
