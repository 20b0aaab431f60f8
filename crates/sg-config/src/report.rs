//! Report output settings.

use serde::{Deserialize, Serialize};

fn default_output_dir() -> String {
    "reports".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Directory report artifacts are written to by the CLI.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}
