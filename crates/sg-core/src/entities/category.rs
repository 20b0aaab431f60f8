use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::FileRecord;
use crate::enums::CategoryStatus;

/// Per-category projection of a session's file records. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    /// Member file ids in insertion order.
    pub files: Vec<String>,
    pub avg_confidence: f64,
    pub status: CategoryStatus,
}

/// Bucket file records by category, in order of each category's first
/// appearance.
#[must_use]
pub fn summarize_categories(files: &[FileRecord]) -> Vec<CategorySummary> {
    let mut order: Vec<&str> = Vec::new();
    for file in files {
        if !order.contains(&file.category.as_str()) {
            order.push(&file.category);
        }
    }

    order
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&FileRecord> =
                files.iter().filter(|f| f.category == category).collect();
            let status = CategoryStatus::reduce(members.iter().map(|f| f.status))?;
            #[allow(clippy::cast_precision_loss)]
            let avg_confidence =
                members.iter().map(|f| f.confidence).sum::<f64>() / members.len() as f64;
            Some(CategorySummary {
                category: category.to_string(),
                count: members.len(),
                files: members.iter().map(|f| f.id.clone()).collect(),
                avg_confidence,
                status,
            })
        })
        .collect()
}
