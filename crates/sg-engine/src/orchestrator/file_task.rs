//! Validation of one file.
//!
//! Validators are synchronous, so the cell loop runs on the blocking pool and
//! streams progress snapshots back over a channel. The async side publishes
//! them to the result book and the status board.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sg_core::entities::{
    CellLocation, Document, Finding, ValidationResult, clamp_confidence,
};
use sg_core::enums::ProcessingStatus;
use sg_core::ids::finding_id;
use sg_rules::{RuleFinding, ValidatorDescriptor};

use super::board::StatusBoard;
use super::book::ResultBook;
use crate::store::SessionStore;

/// Failure reason recorded when a file's run is cancelled.
pub const CANCELLED_REASON: &str = "cancelled";

/// Cells between two progress snapshots.
const PUBLISH_EVERY: usize = 64;

/// Longest gap between two progress snapshots while cells are being checked.
const PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

/// Snapshots in flight between the cell loop and the publisher.
const PROGRESS_BUFFER: usize = 4;

pub(crate) struct FileJob {
    pub session_id: String,
    pub file_id: String,
    pub result: ValidationResult,
    pub document: Arc<Document>,
    pub validators: Vec<ValidatorDescriptor>,
    pub cancel: CancellationToken,
}

/// Shared state a file run reports into.
pub(crate) struct Sinks<'a> {
    pub store: &'a SessionStore,
    pub book: &'a ResultBook,
    pub board: &'a StatusBoard,
}

/// Run every validator over every non-empty cell, in sheet, row, column
/// order. Always returns a terminal result.
pub(crate) async fn validate_file(job: FileJob, sinks: &Sinks<'_>) -> ValidationResult {
    let FileJob {
        session_id,
        file_id,
        mut result,
        document,
        validators,
        cancel,
    } = job;

    if cancel.is_cancelled() {
        return finish(&session_id, &file_id, result, Some(CANCELLED_REASON.to_string()), sinks).await;
    }
    if let Err(error) = sinks
        .store
        .update_file_status(&session_id, &file_id, ProcessingStatus::Processing)
        .await
    {
        return finish(&session_id, &file_id, result, Some(error.to_string()), sinks).await;
    }
    if let Err(error) = result.start() {
        return finish(&session_id, &file_id, result, Some(error.to_string()), sinks).await;
    }
    sinks.book.publish(&result).await;

    tracing::debug!(
        session = %session_id,
        file = %result.file_name,
        validators = validators.len(),
        cells = result.summary.total_cells,
        "validating file"
    );

    let mut latest = result.clone();
    let (tx, mut rx) = mpsc::channel(PROGRESS_BUFFER);
    let work = tokio::task::spawn_blocking(move || {
        check_cells(result, &document, &validators, &cancel, &tx)
    });
    while let Some(snapshot) = rx.recv().await {
        sinks.book.publish(&snapshot).await;
        sinks
            .board
            .file_progress(
                &session_id,
                snapshot.summary.checked_cells,
                snapshot.summary.total_cells,
            )
            .await;
        latest = snapshot;
    }

    let (result, failure) = match work.await {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(file = %latest.file_name, %error, "cell loop aborted");
            (latest, Some(format!("worker aborted: {error}")))
        }
    };
    finish(&session_id, &file_id, result, failure, sinks).await
}

/// The blocking half of a file run. Returns the result with every finding
/// computed so far and the failure reason, if any.
fn check_cells(
    mut result: ValidationResult,
    document: &Document,
    validators: &[ValidatorDescriptor],
    cancel: &CancellationToken,
    progress: &mpsc::Sender<ValidationResult>,
) -> (ValidationResult, Option<String>) {
    let mut seq = 0usize;
    let mut failure = None;
    let mut unreported = 0usize;
    let mut last_report = Instant::now();

    'cells: for (location, text) in document.cells() {
        if cancel.is_cancelled() {
            failure = Some(CANCELLED_REASON.to_string());
            break;
        }
        for descriptor in validators {
            match descriptor.check(text, &location) {
                Ok(raw) => {
                    for finding in raw {
                        seq += 1;
                        let finding =
                            build_finding(&result.id, seq, &descriptor.name, &location, text, finding);
                        result.push_finding(finding);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        file = %result.file_name,
                        cell = %location.cell,
                        %error,
                        "validator failed"
                    );
                    failure = Some(format!("{} at {}!{}", error, location.sheet, location.cell));
                    break 'cells;
                }
            }
        }
        result.mark_cell_checked();

        unreported += 1;
        if unreported >= PUBLISH_EVERY || last_report.elapsed() >= PUBLISH_INTERVAL {
            if progress.blocking_send(result.clone()).is_err() {
                tracing::debug!(file = %result.file_name, "progress receiver closed");
            }
            unreported = 0;
            last_report = Instant::now();
        }
    }

    (result, failure)
}

async fn finish(
    session_id: &str,
    file_id: &str,
    mut result: ValidationResult,
    failure: Option<String>,
    sinks: &Sinks<'_>,
) -> ValidationResult {
    let now = Utc::now();
    let (outcome, status) = match failure {
        None => (result.complete(now), ProcessingStatus::Completed),
        Some(reason) => (result.fail(reason, now), ProcessingStatus::Failed),
    };
    if let Err(error) = outcome {
        tracing::warn!(result = %result.id, %error, "could not finalize result");
    }
    if let Err(error) = sinks.store.update_file_status(session_id, file_id, status).await {
        tracing::warn!(session = %session_id, file = %file_id, %error, "could not update file status");
    }
    sinks.book.publish(&result).await;
    tracing::debug!(
        file = %result.file_name,
        status = %result.status,
        findings = result.finding_count(),
        "file finished"
    );
    result
}

/// Wrap a rule's output in the exchange envelope. An out-of-range highlight
/// is dropped and the finding kept.
fn build_finding(
    result_id: &str,
    seq: usize,
    rule: &str,
    location: &CellLocation,
    text: &str,
    raw: RuleFinding,
) -> Finding {
    let mut finding = Finding {
        id: finding_id(result_id, seq),
        finding_type: raw.finding_type,
        severity: raw.severity,
        message: raw.message,
        location: location.clone(),
        original_text: text.to_string(),
        rule: rule.to_string(),
        confidence: raw.confidence.map(clamp_confidence),
        suggestion: raw.suggestion,
        highlight_range: None,
        context_before: None,
        context_after: None,
        marked_text: None,
    };
    if let Some(range) = raw.highlight
        && let Err(error) = finding.attach_highlight(range)
    {
        tracing::warn!(rule, cell = %location.cell, %error, "dropping out-of-range highlight");
    }
    finding
}
