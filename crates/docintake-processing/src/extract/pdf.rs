//! PDF text extraction.
//!
//! Text comes from pdf-extract, page count from lopdf. Both parsers are
//! blocking and may panic on hostile input, so they run on the blocking pool.
//! A file neither can read is treated as an empty document rather than an
//! error, which sends it down the unsupported path.

use super::{ContentExtractor, ExtractedContent, ExtractionError};
use async_trait::async_trait;
use docintake_core::constants::CONTENT_TYPE_PDF;
use std::path::Path;

pub struct PdfExtractor;

#[async_trait]
impl ContentExtractor for PdfExtractor {
    fn supported_types(&self) -> &[&str] {
        &[CONTENT_TYPE_PDF]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();

        match tokio::task::spawn_blocking(move || parse_pdf(&bytes)).await {
            Ok(content) => Ok(content),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    size_bytes = size,
                    "PDF parser aborted, treating document as empty"
                );
                Ok(ExtractedContent::default())
            }
        }
    }
}

fn parse_pdf(bytes: &[u8]) -> ExtractedContent {
    let page_count = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc.get_pages().len() as u32,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse PDF structure");
            return ExtractedContent::default();
        }
    };

    let text = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, page_count, "Failed to extract PDF text");
            String::new()
        }
    };

    ExtractedContent {
        text,
        page_count: Some(page_count),
        table: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_garbage_pdf_is_empty_document() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4\n").unwrap();

        let content = PdfExtractor.extract(file.path()).await.unwrap();
        assert!(content.text.is_empty());
        assert_eq!(content.page_count, None);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = PdfExtractor
            .extract(Path::new("/nonexistent/docintake.pdf"))
            .await;
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
