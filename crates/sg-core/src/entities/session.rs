use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::FileRecord;

/// A bounded collection of uploaded documents processed together.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub files: Vec<FileRecord>,
}

impl Session {
    #[must_use]
    pub fn file(&self, file_id: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.id == file_id)
    }
}
