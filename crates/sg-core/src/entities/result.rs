use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Finding;
use crate::enums::{ProcessingStatus, Severity};
use crate::errors::CoreError;

/// Validation outcome for one file.
///
/// Findings enter only through [`ValidationResult::push_finding`], which keeps
/// the summary counts equal to the array lengths.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub id: String,
    pub file_name: String,
    pub category: String,
    pub status: ProcessingStatus,
    /// Percentage of cells checked, `0..=100`, never decreasing.
    pub progress: u8,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    pub summary: ValidationSummary,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_cells: usize,
    pub checked_cells: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl ValidationResult {
    #[must_use]
    pub fn new(
        id: String,
        file_name: String,
        category: String,
        total_cells: usize,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            file_name,
            category,
            status: ProcessingStatus::Pending,
            progress: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            summary: ValidationSummary {
                total_cells,
                ..ValidationSummary::default()
            },
            created_at,
            completed_at: None,
            failure_reason: None,
        }
    }

    /// Route a finding into the array for its severity and bump the count.
    pub fn push_finding(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => {
                self.errors.push(finding);
                self.summary.error_count = self.errors.len();
            }
            Severity::Warning => {
                self.warnings.push(finding);
                self.summary.warning_count = self.warnings.len();
            }
            Severity::Info => {
                self.info.push(finding);
                self.summary.info_count = self.info.len();
            }
        }
    }

    /// Record one more checked cell and recompute progress.
    pub fn mark_cell_checked(&mut self) {
        if self.summary.checked_cells < self.summary.total_cells {
            self.summary.checked_cells += 1;
        }
        let progress = if self.summary.total_cells == 0 {
            100
        } else {
            self.summary.checked_cells * 100 / self.summary.total_cells
        };
        self.progress = self.progress.max(u8::try_from(progress.min(100)).unwrap_or(100));
    }

    /// Move to `processing`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless the result is pending.
    pub fn start(&mut self) -> Result<(), CoreError> {
        self.transition(ProcessingStatus::Processing)
    }

    /// Move to `completed` and stamp `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless the result is processing.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(ProcessingStatus::Completed)?;
        self.progress = 100;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Move to `failed`, keeping every finding recorded so far.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the result is already terminal.
    pub fn fail(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(ProcessingStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        self.completed_at = Some(now);
        Ok(())
    }

    /// Total findings across all severities.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    /// All findings in severity order (errors, warnings, info), each group in
    /// sheet → row → column order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// All findings in cell order, ties kept in validator registration order.
    #[must_use]
    pub fn findings_in_cell_order(&self) -> Vec<&Finding> {
        let mut all: Vec<&Finding> = self.findings().collect();
        all.sort_by_key(|f| finding_seq(&f.id));
        all
    }

    fn transition(&mut self, next: ProcessingStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: "validation_result".to_string(),
                id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Sequence number encoded at the end of a finding id (`fnd-<hex>-0007` → 7).
fn finding_seq(id: &str) -> usize {
    id.rsplit('-')
        .next()
        .and_then(|seq| seq.parse().ok())
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::entities::CellLocation;
    use crate::ids::finding_id;

    fn finding(seq: usize, severity: Severity) -> Finding {
        Finding {
            id: finding_id("val-abc", seq),
            finding_type: "spacing".into(),
            severity,
            message: "m".into(),
            location: CellLocation::new("S", 1, u32::try_from(seq).unwrap()),
            original_text: "t".into(),
            rule: "r".into(),
            confidence: None,
            suggestion: None,
            highlight_range: None,
            context_before: None,
            context_after: None,
            marked_text: None,
        }
    }

    #[test]
    fn counts_track_arrays() {
        let mut result = ValidationResult::new("val-abc".into(), "a".into(), "g".into(), 3, Utc::now());
        result.push_finding(finding(1, Severity::Error));
        result.push_finding(finding(2, Severity::Warning));
        result.push_finding(finding(3, Severity::Warning));

        assert_eq!(result.summary.error_count, result.errors.len());
        assert_eq!(result.summary.warning_count, 2);
        assert_eq!(result.summary.info_count, 0);
        assert_eq!(result.finding_count(), 3);
    }

    #[test]
    fn checked_cells_never_exceed_total_and_progress_is_monotonic() {
        let mut result = ValidationResult::new("val-abc".into(), "a".into(), "g".into(), 2, Utc::now());
        result.mark_cell_checked();
        assert_eq!(result.progress, 50);
        result.mark_cell_checked();
        result.mark_cell_checked();
        assert_eq!(result.summary.checked_cells, 2);
        assert_eq!(result.progress, 100);
    }

    #[test]
    fn completed_at_is_set_once() {
        let mut result = ValidationResult::new("val-abc".into(), "a".into(), "g".into(), 0, Utc::now());
        result.start().unwrap();
        let done = Utc::now();
        result.complete(done).unwrap();
        assert_eq!(result.completed_at, Some(done));
        assert!(result.fail("late", Utc::now()).is_err());
        assert_eq!(result.completed_at, Some(done));
        assert_eq!(result.status, ProcessingStatus::Completed);
    }

    #[test]
    fn failing_keeps_findings() {
        let mut result = ValidationResult::new("val-abc".into(), "a".into(), "g".into(), 4, Utc::now());
        result.start().unwrap();
        result.push_finding(finding(1, Severity::Info));
        result.fail("cancelled", Utc::now()).unwrap();
        assert_eq!(result.info.len(), 1);
        assert_eq!(result.failure_reason.as_deref(), Some("cancelled"));
    }

    #[test]
    fn cell_order_interleaves_severities() {
        let mut result = ValidationResult::new("val-abc".into(), "a".into(), "g".into(), 3, Utc::now());
        result.push_finding(finding(2, Severity::Error));
        result.push_finding(finding(1, Severity::Info));
        result.push_finding(finding(3, Severity::Warning));
        let order: Vec<&str> = result
            .findings_in_cell_order()
            .iter()
            .map(|f| f.location.cell.as_str())
            .collect();
        assert_eq!(order, vec!["A1", "B1", "C1"]);
    }
}
