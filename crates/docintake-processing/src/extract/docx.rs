//! Word-processing documents.
//!
//! A DOCX file is a zip container; the body lives in `word/document.xml`.
//! Paragraphs are `<w:p>` elements and their visible text is the
//! concatenation of the `<w:t>` runs inside them.

use super::{ContentExtractor, ExtractedContent, ExtractionError};
use async_trait::async_trait;
use docintake_core::constants::CONTENT_TYPE_DOCX;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const DOCUMENT_XML: &str = "word/document.xml";

pub struct DocxExtractor;

#[async_trait]
impl ContentExtractor for DocxExtractor {
    fn supported_types(&self) -> &[&str] {
        &[CONTENT_TYPE_DOCX]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractionError> {
        let path: PathBuf = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || read_docx_text(&path))
            .await
            .map_err(|e| ExtractionError::Failed(format!("DOCX task join error: {}", e)))??;

        Ok(ExtractedContent {
            text,
            page_count: None,
            table: None,
        })
    }
}

fn read_docx_text(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ExtractionError::Failed(format!("Not a DOCX container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| ExtractionError::Failed(format!("Missing {}: {}", DOCUMENT_XML, e)))?
        .read_to_string(&mut xml)?;

    paragraphs_from_xml(&xml)
}

fn paragraphs_from_xml(xml: &str) -> Result<String, ExtractionError> {
    // Opening tag must not be self-closing, and must not match <w:pPr> and friends
    let paragraph = Regex::new(r"(?s)<w:p(?:\s[^>]*[^/])?>(.*?)</w:p>")
        .map_err(|e| ExtractionError::Failed(format!("Invalid paragraph pattern: {}", e)))?;
    let run = Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>")
        .map_err(|e| ExtractionError::Failed(format!("Invalid run pattern: {}", e)))?;

    let paragraphs: Vec<String> = paragraph
        .captures_iter(xml)
        .map(|p| {
            run.captures_iter(&p[1])
                .map(|t| unescape_xml(&t[1]))
                .collect::<String>()
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::FileOptions;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Quarterly</w:t></w:r><w:r><w:t xml:space="preserve"> report</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>R&amp;D spend rose</w:t></w:r><w:r><w:tab/><w:t>12%</w:t></w:r></w:p>
</w:body>
</w:document>"#;

    fn docx_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        {
            let mut writer = zip::ZipWriter::new(file.as_file_mut());
            writer
                .start_file(DOCUMENT_XML, FileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        file
    }

    #[test]
    fn test_paragraphs_joined_by_newline() {
        let text = paragraphs_from_xml(BODY).unwrap();
        assert_eq!(text, "Quarterly report\nR&D spend rose12%");
    }

    #[tokio::test]
    async fn test_extract_from_container() {
        let file = docx_file(BODY);
        let content = DocxExtractor.extract(file.path()).await.unwrap();
        assert!(content.text.starts_with("Quarterly report"));
        assert_eq!(content.page_count, None);
    }

    #[tokio::test]
    async fn test_not_a_zip_fails() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"plain text").unwrap();
        let result = DocxExtractor.extract(file.path()).await;
        assert!(matches!(result, Err(ExtractionError::Failed(_))));
    }
}
