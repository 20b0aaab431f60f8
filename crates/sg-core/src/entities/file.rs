use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ProcessingStatus;

/// Fallback category for documents the classifier cannot place.
pub const GENERIC_CATEGORY: &str = "generic";

/// One uploaded document within a session.
///
/// Created by the classifier step; afterwards only the orchestrator touches
/// `status` and `validation_id`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    pub category: String,
    /// Classifier confidence, always within `[0, 1]`.
    pub confidence: f64,
    pub status: ProcessingStatus,
    pub validation_id: Option<String>,
    pub metadata: Option<ClassificationMetadata>,
}

/// Classifier diagnostics attached to a file record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationMetadata {
    pub sheet_count: u32,
    #[serde(default)]
    pub detected_keywords: Vec<String>,
    #[serde(default)]
    pub suggested_categories: Vec<String>,
}

impl FileRecord {
    /// Build a pending record. `confidence` is clamped into `[0, 1]`; NaN
    /// becomes 0.
    #[must_use]
    pub fn new(
        id: String,
        file_name: String,
        file_size: u64,
        category: String,
        confidence: f64,
        metadata: Option<ClassificationMetadata>,
    ) -> Self {
        Self {
            id,
            file_name,
            file_size,
            category,
            confidence: clamp_confidence(confidence),
            status: ProcessingStatus::Pending,
            validation_id: None,
            metadata,
        }
    }
}

/// Clamp a confidence score into `[0, 1]`.
#[must_use]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_pending_and_clamped() {
        let record = FileRecord::new(
            "fil-1".into(),
            "a.xlsx".into(),
            10,
            "attendance".into(),
            1.7,
            None,
        );
        assert_eq!(record.status, ProcessingStatus::Pending);
        assert!((record.confidence - 1.0).abs() < f64::EPSILON);
        assert!(record.validation_id.is_none());
    }

    #[test]
    fn nan_confidence_becomes_zero() {
        assert!(clamp_confidence(f64::NAN).abs() < f64::EPSILON);
        assert!(clamp_confidence(-0.3).abs() < f64::EPSILON);
    }
}
