use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::DocumentRecord;

/// Bucket and key of an uploaded object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

/// Queue message asking a worker to process one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub file_id: Uuid,
    pub user_id: String,
    pub file_type: String,
    pub s3_location: StorageLocation,
}

impl WorkItem {
    pub fn for_record(record: &DocumentRecord, bucket: &str) -> Self {
        Self {
            file_id: record.file_id,
            user_id: record.user_id.clone(),
            file_type: record.content_type.clone(),
            s3_location: StorageLocation {
                bucket: bucket.to_string(),
                key: record.storage_key.clone(),
            },
        }
    }

    pub fn to_message_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_message_body(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}
