//! Cross-cutting error types for saenggi.
//!
//! Domain-specific errors (`EngineError`, `ReportError`, `RuleError`) are
//! defined in their respective crates. The CLI converges everything into
//! `anyhow` at the binary boundary.

use thiserror::Error;

/// Errors that can be raised by any saenggi crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// A highlight range does not fit inside the text it points into.
    #[error("Invalid highlight range {start}..{end} for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}
