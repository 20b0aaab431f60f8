//! Engine error types for sg-engine.

use sg_core::errors::CoreError;
use thiserror::Error;

/// Errors from session storage, orchestration, and status polling.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown session, file, or validation id.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// The run could not proceed, or a file's validator failed.
    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// The status endpoint asked the caller to back off.
    #[error("Rate limited, retry after {retry_after_ms} ms")]
    RateLimited { retry_after_ms: u64 },

    /// The caller-side polling ceiling was reached.
    #[error("Timed out after {attempts} polling attempts")]
    Timeout { attempts: u32 },

    /// The operation conflicts with the current run state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EngineError {
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether this error names a missing entity, including the core variant.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Core(CoreError::NotFound { .. })
        )
    }
}
