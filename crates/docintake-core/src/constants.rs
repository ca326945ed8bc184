//! Fixed limits and allowlists shared by the coordinator and the workers.

/// Content types accepted at upload-request time.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    CONTENT_TYPE_PDF,
    CONTENT_TYPE_JPEG,
    CONTENT_TYPE_PNG,
    CONTENT_TYPE_CSV,
    CONTENT_TYPE_DOCX,
    CONTENT_TYPE_XLSX,
];

pub const CONTENT_TYPE_PDF: &str = "application/pdf";
pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";
pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_CSV: &str = "text/csv";
pub const CONTENT_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const CONTENT_TYPE_XLSX: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Extension used for storage keys when the file name has none.
pub const DEFAULT_EXTENSION: &str = "bin";

/// Extracted text is cut to this many characters before classification.
pub const MAX_EXTRACTED_TEXT_CHARS: usize = 5000;

/// Characters of text shown to the classifier.
pub const CLASSIFIER_SNIPPET_CHARS: usize = 4000;

/// Characters of text embedded in a structured-extraction prompt.
pub const EXTRACTION_PROMPT_CHARS: usize = 8000;

/// Characters kept as `rawTextPreview` in fallback metadata.
pub const FALLBACK_PREVIEW_CHARS: usize = 500;

/// Characters kept as `textPreview` in completed metadata.
pub const TEXT_PREVIEW_CHARS: usize = 1000;

/// Number of data rows sampled from CSV files.
pub const CSV_SAMPLE_ROWS: usize = 3;

/// Maximum number of records returned by the history listing.
pub const HISTORY_LIMIT: i64 = 50;

/// Returns true when the content type may be uploaded.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

/// Returns the first `max_chars` characters of `text` without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
