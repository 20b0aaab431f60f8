//! Batch statistics and per-category grouping of validation results.
//!
//! Category success rates are computed per bucket and the session rate is the
//! plain mean of the bucket rates, so a category with few files weighs as much
//! as a large one.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use sg_core::entities::{FileRecord, ValidationResult};

/// Bucket for results whose file name matches no file record.
pub const UNCLASSIFIED: &str = "unclassified";

/// Totals over a set of results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total_files: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_info: usize,
    pub total_cells: usize,
}

impl BatchStats {
    #[must_use]
    pub const fn total_findings(&self) -> usize {
        self.total_errors + self.total_warnings + self.total_info
    }
}

/// Results of one category with their combined statistics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: String,
    /// Validation ids, in input order.
    pub results: Vec<String>,
    pub stats: BatchStats,
    /// `0..=100`.
    pub success_rate: u8,
}

#[must_use]
pub fn aggregate<'a, I>(results: I) -> BatchStats
where
    I: IntoIterator<Item = &'a ValidationResult>,
{
    results
        .into_iter()
        .fold(BatchStats::default(), |mut stats, result| {
            stats.total_files += 1;
            stats.total_errors += result.errors.len();
            stats.total_warnings += result.warnings.len();
            stats.total_info += result.info.len();
            stats.total_cells += result.summary.total_cells;
            stats
        })
}

/// Bucket results by the category of the file record with the same file name.
///
/// Buckets appear in order of their first result; the [`UNCLASSIFIED`] bucket
/// always comes last.
#[must_use]
pub fn group_by_category(results: &[ValidationResult], records: &[FileRecord]) -> Vec<CategoryGroup> {
    let mut category_of: HashMap<&str, &str> = HashMap::new();
    for record in records {
        category_of
            .entry(record.file_name.as_str())
            .or_insert(record.category.as_str());
    }

    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<&ValidationResult>> = HashMap::new();
    for result in results {
        let category = category_of
            .get(result.file_name.as_str())
            .copied()
            .unwrap_or(UNCLASSIFIED);
        let bucket = members.entry(category).or_default();
        if bucket.is_empty() {
            order.push(category);
        }
        bucket.push(result);
    }
    if let Some(index) = order.iter().position(|c| *c == UNCLASSIFIED) {
        let unclassified = order.remove(index);
        order.push(unclassified);
    }

    order
        .into_iter()
        .map(|category| {
            let bucket = members.remove(category).unwrap_or_default();
            let stats = aggregate(bucket.iter().copied());
            CategoryGroup {
                category: category.to_string(),
                results: bucket.iter().map(|r| r.id.clone()).collect(),
                success_rate: success_rate(&stats),
                stats,
            }
        })
        .collect()
}

/// `round(100 * (cells - issues) / cells)` where issues are errors plus
/// warnings, floored at 0. Zero cells give 0.
#[must_use]
pub fn success_rate(stats: &BatchStats) -> u8 {
    if stats.total_cells == 0 {
        return 0;
    }
    let issues = stats.total_errors + stats.total_warnings;
    let clean = stats.total_cells.saturating_sub(issues);
    #[allow(clippy::cast_precision_loss)]
    let rate = (100.0 * clean as f64 / stats.total_cells as f64).round();
    to_percent(rate)
}

/// Mean of the category rates, rounded. No categories give 0.
#[must_use]
pub fn overall_success_rate(groups: &[CategoryGroup]) -> u8 {
    if groups.is_empty() {
        return 0;
    }
    let sum: u32 = groups.iter().map(|g| u32::from(g.success_rate)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = (f64::from(sum) / groups.len() as f64).round();
    to_percent(mean)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sg_core::entities::{CellLocation, Finding};
    use sg_core::enums::Severity;
    use sg_core::ids::finding_id;

    use super::*;

    fn result(id: &str, file_name: &str, cells: usize, severities: &[Severity]) -> ValidationResult {
        let mut result = ValidationResult::new(
            id.to_string(),
            file_name.to_string(),
            "ignored".to_string(),
            cells,
            Utc::now(),
        );
        for (index, severity) in severities.iter().enumerate() {
            result.push_finding(Finding {
                id: finding_id(id, index + 1),
                finding_type: "t".into(),
                severity: *severity,
                message: "m".into(),
                location: CellLocation::new("S", 1, 1),
                original_text: "x".into(),
                rule: "r".into(),
                confidence: None,
                suggestion: None,
                highlight_range: None,
                context_before: None,
                context_after: None,
                marked_text: None,
            });
        }
        result
    }

    fn record(file_name: &str, category: &str) -> FileRecord {
        FileRecord::new(
            format!("fil-{file_name}"),
            file_name.to_string(),
            1,
            category.to_string(),
            0.9,
            None,
        )
    }

    #[test]
    fn aggregate_sums_arrays_and_cells() {
        let results = vec![
            result("val-a", "a", 10, &[Severity::Error, Severity::Info]),
            result("val-b", "b", 5, &[Severity::Warning, Severity::Warning]),
        ];
        let stats = aggregate(&results);
        assert_eq!(
            stats,
            BatchStats {
                total_files: 2,
                total_errors: 1,
                total_warnings: 2,
                total_info: 1,
                total_cells: 15,
            }
        );
        assert_eq!(stats.total_findings(), 4);
    }

    #[test]
    fn unmatched_results_fall_into_unclassified_last() {
        let results = vec![
            result("val-a", "stray.xlsx", 1, &[]),
            result("val-b", "att.xlsx", 1, &[]),
            result("val-c", "att2.xlsx", 1, &[]),
        ];
        let records = vec![record("att.xlsx", "attendance"), record("att2.xlsx", "attendance")];
        let groups = group_by_category(&results, &records);

        let names: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, vec!["attendance", UNCLASSIFIED]);
        assert_eq!(groups[0].results, vec!["val-b", "val-c"]);
        assert_eq!(groups[1].results, vec!["val-a"]);
        assert_eq!(
            groups.iter().map(|g| g.stats.total_files).sum::<usize>(),
            results.len()
        );
    }

    #[rstest]
    #[case::no_cells(0, 0, 0, 0)]
    #[case::clean(10, 0, 0, 100)]
    #[case::info_is_not_an_issue(10, 0, 5, 100)]
    #[case::rounds_half_up(8, 1, 0, 88)]
    #[case::issues_exceed_cells(2, 5, 0, 0)]
    fn category_success_rate(
        #[case] cells: usize,
        #[case] errors: usize,
        #[case] info: usize,
        #[case] expected: u8,
    ) {
        let stats = BatchStats {
            total_files: 1,
            total_errors: errors,
            total_warnings: 0,
            total_info: info,
            total_cells: cells,
        };
        assert_eq!(success_rate(&stats), expected);
    }

    #[test]
    fn overall_rate_is_the_mean_of_category_rates() {
        // One small perfect category and one large poor one: the mean is not
        // cell-weighted.
        let results = vec![
            result("val-a", "small.xlsx", 2, &[]),
            result(
                "val-b",
                "large.xlsx",
                100,
                &[Severity::Error; 50],
            ),
        ];
        let records = vec![record("small.xlsx", "behavior"), record("large.xlsx", "attendance")];
        let groups = group_by_category(&results, &records);
        assert_eq!(groups[0].success_rate, 100);
        assert_eq!(groups[1].success_rate, 50);
        assert_eq!(overall_success_rate(&groups), 75);
        assert_eq!(overall_success_rate(&[]), 0);
    }
}
