//! ID prefixes and generators.
//!
//! Entity ids are `<prefix>-<12 hex chars>` from OS randomness. Finding ids are
//! derived from their result id plus a 1-based sequence number so a result's
//! findings can be regenerated byte-for-byte.

use std::fmt::Write;

use crate::errors::CoreError;

pub const PREFIX_SESSION: &str = "ses";
pub const PREFIX_FILE: &str = "fil";
pub const PREFIX_VALIDATION: &str = "val";
pub const PREFIX_FINDING: &str = "fnd";

/// Generate a prefixed random id, e.g. `"ses-3fa81c02b9d4"`.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source is unavailable.
pub fn generate_id(prefix: &str) -> Result<String, CoreError> {
    let mut bytes = [0u8; 6];
    getrandom::fill(&mut bytes)
        .map_err(|e| CoreError::Other(anyhow::anyhow!("random source unavailable: {e}")))?;
    let mut id = String::with_capacity(prefix.len() + 1 + bytes.len() * 2);
    id.push_str(prefix);
    id.push('-');
    for byte in bytes {
        let _ = write!(id, "{byte:02x}");
    }
    Ok(id)
}

/// Derive the id of the `seq`-th finding (1-based) of a validation result.
#[must_use]
pub fn finding_id(result_id: &str, seq: usize) -> String {
    let suffix = result_id
        .split_once('-')
        .map_or(result_id, |(_, suffix)| suffix);
    format!("{PREFIX_FINDING}-{suffix}-{seq:04}")
}

/// Return the prefix portion of an id (`"val"` for `"val-0a1b2c3d4e5f"`).
#[must_use]
pub fn prefix_of(id: &str) -> Option<&str> {
    id.split_once('-').map(|(prefix, _)| prefix)
}
