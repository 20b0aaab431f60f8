//! Built-in rule thresholds.

use serde::{Deserialize, Serialize};

const fn default_spacing_threshold() -> usize {
    5
}

const fn default_byte_limit() -> usize {
    1500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    /// Consecutive spaces that trigger a spacing finding.
    #[serde(default = "default_spacing_threshold")]
    pub spacing_threshold: usize,

    /// NEIS byte limit for free-text remark cells.
    #[serde(default = "default_byte_limit")]
    pub byte_limit: usize,

    /// Extra terms appended to the built-in forbidden list.
    #[serde(default)]
    pub forbidden_terms: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            spacing_threshold: default_spacing_threshold(),
            byte_limit: default_byte_limit(),
            forbidden_terms: Vec::new(),
        }
    }
}
