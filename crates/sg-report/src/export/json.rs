//! JSON rendering: full `ValidationResult` objects, highlight ranges included.

use sg_core::entities::ValidationResult;

use crate::error::ReportError;

/// A merged export is always an array; a single result is a bare object.
pub fn render(results: &[&ValidationResult], merged: bool) -> Result<Vec<u8>, ReportError> {
    let bytes = match results {
        [single] if !merged => serde_json::to_vec_pretty(single)?,
        all => serde_json::to_vec_pretty(all)?,
    };
    Ok(bytes)
}
