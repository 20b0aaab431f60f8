//! Response envelopes returned to UI and CLI consumers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{CategorySummary, Session, ValidationResult};

/// Result of a synchronous session validation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidation {
    /// `true` when the orchestration ran; individual files may still have
    /// failed.
    pub success: bool,
    pub results: Vec<ValidationResult>,
}

/// Session snapshot plus its category projection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionOverview {
    pub session: Session,
    pub categories: Vec<CategorySummary>,
}
