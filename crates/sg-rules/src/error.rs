//! Rule and classifier error types.

use thiserror::Error;

/// Unrecoverable failure of a validator on one cell. The orchestrator fails
/// the whole file when it sees one.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The validator reported that it cannot evaluate the input.
    #[error("rule {rule} failed: {reason}")]
    Failed { rule: String, reason: String },

    /// The validator panicked.
    #[error("rule {rule} panicked: {message}")]
    Panicked { rule: String, message: String },
}

impl RuleError {
    pub fn failed(rule: &str, reason: impl Into<String>) -> Self {
        Self::Failed {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The document has no sheets to inspect.
    #[error("document {0} has no sheets")]
    EmptyDocument(String),

    #[error("classifier failed: {0}")]
    Failed(String),
}
