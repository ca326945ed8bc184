//! Extract, classify, then extract structured metadata.

use docintake_core::constants::{truncate_chars, TEXT_PREVIEW_CHARS};
use docintake_core::models::{DocumentMetadata, ExtractedMetadata};
use docintake_core::AppError;
use std::path::Path;
use std::sync::Arc;

use crate::classify::Classifier;
use crate::extract::ExtractorRegistry;
use crate::structured::MetadataExtractor;

#[derive(Clone)]
pub struct AnalysisPipeline {
    extractors: ExtractorRegistry,
    classifier: Arc<dyn Classifier>,
    metadata: Arc<dyn MetadataExtractor>,
}

impl AnalysisPipeline {
    pub fn new(
        extractors: ExtractorRegistry,
        classifier: Arc<dyn Classifier>,
        metadata: Arc<dyn MetadataExtractor>,
    ) -> Self {
        Self {
            extractors,
            classifier,
            metadata,
        }
    }

    /// Analyze a local file of the declared content type.
    ///
    /// Errors cover unreadable files and a failing metadata service; an
    /// unclassifiable document still succeeds with fallback metadata.
    #[tracing::instrument(skip(self, path))]
    pub async fn analyze(
        &self,
        path: &Path,
        content_type: &str,
    ) -> Result<DocumentMetadata, AppError> {
        let content = self.extractors.extract(path, content_type).await?;
        let label = self.classifier.classify(&content.text).await;

        tracing::debug!(
            document_type = %label,
            chars = content.text.chars().count(),
            page_count = ?content.page_count,
            "Document classified"
        );

        let extracted = if label.is_fallback() {
            ExtractedMetadata::fallback(&content.text)
        } else {
            self.metadata
                .extract_structured(label, &content.text, content.page_count)
                .await
                .map_err(|e| AppError::Processing(format!("Metadata extraction failed: {}", e)))?
        };

        Ok(DocumentMetadata::new(
            extracted,
            truncate_chars(&content.text, TEXT_PREVIEW_CHARS).to_string(),
            content.page_count,
            content.table,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ContentExtractor, ExtractedContent, ExtractionError};
    use async_trait::async_trait;
    use docintake_core::models::{DocumentLabel, QuestionPaperMetadata};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedText(&'static str);

    #[async_trait]
    impl ContentExtractor for FixedText {
        fn supported_types(&self) -> &[&str] {
            &["application/pdf"]
        }

        async fn extract(&self, _path: &Path) -> Result<ExtractedContent, ExtractionError> {
            Ok(ExtractedContent {
                text: self.0.to_string(),
                page_count: Some(4),
                table: None,
            })
        }
    }

    struct Always(DocumentLabel);

    #[async_trait]
    impl Classifier for Always {
        async fn classify(&self, _text: &str) -> DocumentLabel {
            self.0
        }
    }

    #[derive(Default)]
    struct CountingExtractor {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl MetadataExtractor for CountingExtractor {
        async fn extract_structured(
            &self,
            label: DocumentLabel,
            _text: &str,
            _page_count: Option<u32>,
        ) -> anyhow::Result<ExtractedMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("upstream timeout");
            }
            Ok(ExtractedMetadata::empty(label))
        }
    }

    fn pipeline(
        text: &'static str,
        label: DocumentLabel,
        metadata: Arc<CountingExtractor>,
    ) -> AnalysisPipeline {
        let mut registry = ExtractorRegistry::new();
        registry.register(FixedText(text));
        AnalysisPipeline::new(registry, Arc::new(Always(label)), metadata)
    }

    #[tokio::test]
    async fn test_classified_document_gets_typed_metadata() {
        let counter = Arc::new(CountingExtractor::default());
        let pipeline = pipeline("Q1. Define entropy.", DocumentLabel::QuestionPaper, counter.clone());

        let meta = pipeline
            .analyze(Path::new("/tmp/x.pdf"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(meta.document_type, DocumentLabel::QuestionPaper);
        assert_eq!(
            meta.extracted,
            ExtractedMetadata::QuestionPaper(QuestionPaperMetadata::default())
        );
        assert_eq!(meta.page_count, Some(4));
        assert_eq!(meta.text_preview, "Q1. Define entropy.");
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_skips_metadata_service() {
        let counter = Arc::new(CountingExtractor::default());
        let pipeline = pipeline("lorem ipsum", DocumentLabel::Unsupported, counter.clone());

        let meta = pipeline
            .analyze(Path::new("/tmp/x.pdf"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(meta.document_type, DocumentLabel::Unsupported);
        assert_eq!(meta.extracted, ExtractedMetadata::fallback("lorem ipsum"));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_metadata_service_failure_is_processing_error() {
        let counter = Arc::new(CountingExtractor {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let pipeline = pipeline("INVOICE", DocumentLabel::Invoice, counter);

        let err = pipeline
            .analyze(Path::new("/tmp/x.pdf"), "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Processing(_)));
    }

    #[tokio::test]
    async fn test_unsupported_content_type_never_reads_file() {
        let counter = Arc::new(CountingExtractor::default());
        let pipeline = pipeline("unused", DocumentLabel::Unsupported, counter);

        let meta = pipeline
            .analyze(Path::new("/nonexistent"), "application/zip")
            .await
            .unwrap();
        assert_eq!(meta.text_preview, "Unsupported format");
        assert_eq!(meta.page_count, None);
    }
}
