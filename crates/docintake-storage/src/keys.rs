//! Storage key derivation.
//!
//! Key format: `uploads/{user_id}/{YYYY}/{MM}/{DD}/{file_id}.{extension}` using
//! the UTC creation date. Keys never contain `..` or a leading `/`.

use chrono::{DateTime, Datelike, Utc};
use docintake_core::constants::DEFAULT_EXTENSION;
use uuid::Uuid;

/// Extension after the last `.` of `file_name`, or `bin` when there is none.
pub fn extension_from_file_name(file_name: &str) -> String {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return DEFAULT_EXTENSION.to_string(),
    };
    let ext: String = ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        ext
    }
}

/// Generate the storage key for a new upload.
pub fn generate_storage_key(
    user_id: &str,
    file_id: Uuid,
    file_name: &str,
    created_at: DateTime<Utc>,
) -> String {
    format!(
        "uploads/{}/{:04}/{:02}/{:02}/{}.{}",
        sanitize_segment(user_id),
        created_at.year(),
        created_at.month(),
        created_at.day(),
        file_id,
        extension_from_file_name(file_name)
    )
}

fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '@' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.replace("..", "__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extension() {
        assert_eq!(extension_from_file_name("report.pdf"), "pdf");
        assert_eq!(extension_from_file_name("archive.tar.gz"), "gz");
        assert_eq!(extension_from_file_name("README"), "bin");
        assert_eq!(extension_from_file_name("trailing."), "bin");
    }

    #[test]
    fn test_key_layout() {
        let file_id = Uuid::parse_str("0b7c6a9e-1d2f-4c1e-8f5a-3a3b2c1d0e9f").unwrap();
        let created = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 0).unwrap();
        assert_eq!(
            generate_storage_key("user-42", file_id, "scan.PNG", created),
            "uploads/user-42/2024/03/07/0b7c6a9e-1d2f-4c1e-8f5a-3a3b2c1d0e9f.PNG"
        );
    }

    #[test]
    fn test_user_segment_cannot_escape() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let key = generate_storage_key("../../etc", Uuid::nil(), "a.pdf", created);
        assert!(!key.contains(".."));
        assert!(key.starts_with("uploads/"));
        assert_eq!(key.matches('/').count(), 5);
    }
}
