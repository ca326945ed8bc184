use super::{ContentExtractor, ExtractedContent, ExtractionError};
use async_trait::async_trait;
use docintake_core::constants::{CONTENT_TYPE_JPEG, CONTENT_TYPE_PNG};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// OCR for raster images through the tesseract CLI.
pub struct TesseractExtractor {
    tesseract_path: String,
}

impl TesseractExtractor {
    pub fn new(tesseract_path: impl Into<String>) -> Self {
        Self {
            tesseract_path: tesseract_path.into(),
        }
    }
}

#[async_trait]
impl ContentExtractor for TesseractExtractor {
    fn supported_types(&self) -> &[&str] {
        &[CONTENT_TYPE_JPEG, CONTENT_TYPE_PNG]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractionError> {
        let start = std::time::Instant::now();

        // "stdout" as the output base makes tesseract print instead of writing a file
        let output = Command::new(&self.tesseract_path)
            .arg(path)
            .arg("stdout")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExtractionError::Ocr(format!("Failed to execute tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        tracing::debug!(
            chars = text.chars().count(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OCR finished"
        );

        Ok(ExtractedContent {
            text,
            page_count: Some(1),
            table: None,
        })
    }
}
