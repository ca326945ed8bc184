use super::{ContentExtractor, ExtractedContent, ExtractionError};
use async_trait::async_trait;
use docintake_core::constants::{CONTENT_TYPE_CSV, CSV_SAMPLE_ROWS};
use docintake_core::models::TableShape;
use std::path::{Path, PathBuf};

/// Header and leading rows of a CSV file.
///
/// The sampled rows are also rendered as text so the classifier has
/// something to look at.
pub struct CsvExtractor;

#[async_trait]
impl ContentExtractor for CsvExtractor {
    fn supported_types(&self) -> &[&str] {
        &[CONTENT_TYPE_CSV]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractionError> {
        let path: PathBuf = path.to_path_buf();
        let table = tokio::task::spawn_blocking(move || sample_table(&path))
            .await
            .map_err(|e| ExtractionError::Failed(format!("CSV task join error: {}", e)))??;

        Ok(ExtractedContent {
            text: render_table(&table),
            page_count: None,
            table: Some(table),
        })
    }
}

fn sample_table(path: &Path) -> Result<TableShape, ExtractionError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let columns = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut sample_rows = Vec::with_capacity(CSV_SAMPLE_ROWS);
    for record in reader.records().take(CSV_SAMPLE_ROWS) {
        let record = record.map_err(csv_error)?;
        sample_rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(TableShape {
        columns,
        sample_rows,
    })
}

fn render_table(table: &TableShape) -> String {
    let mut lines = Vec::with_capacity(table.sample_rows.len() + 1);
    lines.push(format!("Columns: {}", table.columns.join(", ")));
    for row in &table.sample_rows {
        lines.push(row.join(", "));
    }
    lines.join("\n")
}

fn csv_error(err: ::csv::Error) -> ExtractionError {
    if err.is_io_error() {
        if let ::csv::ErrorKind::Io(io) = err.into_kind() {
            return ExtractionError::Io(io);
        }
        return ExtractionError::Failed("CSV read failed".to_string());
    }
    ExtractionError::Failed(format!("Malformed CSV: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_samples_three_rows() {
        let file = csv_file("name, amount\nalpha,1\nbeta,2\ngamma,3\ndelta,4\n");
        let content = CsvExtractor.extract(file.path()).await.unwrap();

        let table = content.table.unwrap();
        assert_eq!(table.columns, vec!["name", "amount"]);
        assert_eq!(table.sample_rows.len(), 3);
        assert_eq!(table.sample_rows[2], vec!["gamma", "3"]);
        assert_eq!(content.page_count, None);
        assert_eq!(
            content.text,
            "Columns: name, amount\nalpha, 1\nbeta, 2\ngamma, 3"
        );
    }

    #[tokio::test]
    async fn test_header_only() {
        let file = csv_file("a,b,c\n");
        let content = CsvExtractor.extract(file.path()).await.unwrap();
        let table = content.table.unwrap();
        assert_eq!(table.columns.len(), 3);
        assert!(table.sample_rows.is_empty());
    }

    #[tokio::test]
    async fn test_ragged_rows_are_tolerated() {
        let file = csv_file("a,b\n1\n2,3,4\n");
        let content = CsvExtractor.extract(file.path()).await.unwrap();
        assert_eq!(content.table.unwrap().sample_rows.len(), 2);
    }
}
