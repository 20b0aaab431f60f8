use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ValidationResult;
use crate::enums::ProcessingStatus;

/// Published progress of an asynchronous session validation run.
///
/// `results` is filled only when `status` is `completed`, and
/// `completed_files` never exceeds `total_files`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidationStatus {
    pub session_id: String,
    pub status: ProcessingStatus,
    pub progress: u8,
    pub current_file: Option<String>,
    pub completed_files: usize,
    pub total_files: usize,
    pub results: Vec<ValidationResult>,
    pub summary: RunSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub processing_time_seconds: f64,
    pub failed_files: usize,
    pub total_findings: usize,
}

impl SessionValidationStatus {
    #[must_use]
    pub fn pending(session_id: &str, total_files: usize, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.to_string(),
            status: ProcessingStatus::Pending,
            progress: 0,
            current_file: None,
            completed_files: 0,
            total_files,
            results: Vec::new(),
            summary: RunSummary::default(),
            error: None,
            started_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
