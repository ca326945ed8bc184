use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::metadata::DocumentMetadata;
use crate::error::AppError;

/// Lifecycle state of an ingested document.
///
/// `pending` is initial, `completed` and `failed` are terminal. The only way
/// out of `failed` is an explicit retry back to `pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Pending,
        DocumentStatus::Processing,
        DocumentStatus::Completed,
        DocumentStatus::Failed,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed)
    }

    /// Whether a record in this status may move to `next`.
    ///
    /// Self-transitions are allowed for `processing` (a redelivered message
    /// re-marks the record) and `pending` (retry on a record that is already
    /// waiting for a worker).
    pub fn can_transition_to(self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Failed, Pending)
                | (Pending, Pending)
        )
    }

    pub fn transition(self, next: DocumentStatus) -> Result<DocumentStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Statuses from which `target` is reachable in one step.
    pub fn sources_of(target: DocumentStatus) -> Vec<DocumentStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(target))
            .collect()
    }

    /// Human readable description shown by the status endpoint.
    pub fn message(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "File uploaded. Awaiting processing.",
            DocumentStatus::Processing => "File is being processed.",
            DocumentStatus::Completed => "Processing completed.",
            DocumentStatus::Failed => "Processing failed.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        }
    }
}

impl Display for DocumentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "processing" => Ok(DocumentStatus::Processing),
            "completed" => Ok(DocumentStatus::Completed),
            "failed" => Ok(DocumentStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid document status: {}", s)),
        }
    }
}

/// A mutation of a record's lifecycle fields.
///
/// Every write to `status`, `error`, `metadata` or `completed_at` goes through
/// one of these so the record store can check the transition atomically.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    /// Work has been scheduled or picked up; clears any previous error.
    MarkProcessing,
    Complete { metadata: DocumentMetadata },
    Fail { error: String },
    /// Explicit caller retry; clears the error and terminal timestamp.
    ResetForRetry,
}

impl StatusUpdate {
    pub fn target(&self) -> DocumentStatus {
        match self {
            StatusUpdate::MarkProcessing => DocumentStatus::Processing,
            StatusUpdate::Complete { .. } => DocumentStatus::Completed,
            StatusUpdate::Fail { .. } => DocumentStatus::Failed,
            StatusUpdate::ResetForRetry => DocumentStatus::Pending,
        }
    }
}

/// Per-document lifecycle row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub file_id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub storage_key: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub metadata: Option<DocumentMetadata>,
}

impl DocumentRecord {
    pub fn new_pending(
        file_id: Uuid,
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        file_size_bytes: i64,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            file_id,
            user_id: user_id.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            file_size_bytes,
            storage_key: storage_key.into(),
            status: DocumentStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
            metadata: None,
        }
    }

    /// Apply `update` in place, rejecting transitions the state machine forbids.
    pub fn apply(&mut self, update: StatusUpdate, now: DateTime<Utc>) -> Result<(), AppError> {
        self.status = self.status.transition(update.target())?;
        match update {
            StatusUpdate::MarkProcessing => {
                self.error = None;
                self.metadata = None;
            }
            StatusUpdate::Complete { metadata } => {
                self.metadata = Some(metadata);
                self.error = None;
                self.completed_at = Some(now);
            }
            StatusUpdate::Fail { error } => {
                self.error = Some(error);
                self.metadata = None;
                self.completed_at = Some(now);
            }
            StatusUpdate::ResetForRetry => {
                self.error = None;
                self.metadata = None;
                self.completed_at = None;
            }
        }
        Ok(())
    }

    /// `metadata` is present exactly when completed, `error` exactly when failed.
    pub fn is_consistent(&self) -> bool {
        self.metadata.is_some() == (self.status == DocumentStatus::Completed)
            && self.error.is_some() == (self.status == DocumentStatus::Failed)
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.created_at)
    }
}
