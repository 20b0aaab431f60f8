//! Published status snapshots for asynchronous runs.
//!
//! Every write goes through the single board lock and readers clone the whole
//! snapshot, so a poller never sees a half-applied update. Once a snapshot is
//! terminal no further write changes it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use sg_core::entities::{SessionValidationStatus, ValidationResult};
use sg_core::enums::ProcessingStatus;

use crate::error::EngineError;

/// Failure reason for runs that stopped publishing updates.
pub const STALE_REASON: &str = "stale: no progress reported within the staleness ceiling";

struct RunEntry {
    snapshot: SessionValidationStatus,
    started: Instant,
    last_update: Instant,
    last_poll: Option<Instant>,
    cancel: CancellationToken,
}

impl RunEntry {
    fn touch(&mut self) {
        self.last_update = Instant::now();
        self.snapshot.updated_at = Utc::now();
    }

    fn fail(&mut self, reason: String) {
        self.snapshot.status = ProcessingStatus::Failed;
        self.snapshot.current_file = None;
        self.snapshot.error = Some(reason);
        self.snapshot.summary.processing_time_seconds = self.started.elapsed().as_secs_f64();
        self.touch();
    }
}

#[derive(Default)]
pub(crate) struct StatusBoard {
    runs: RwLock<HashMap<String, RunEntry>>,
}

impl StatusBoard {
    /// Publish a fresh `processing` snapshot, replacing any earlier terminal one.
    pub(crate) async fn begin(
        &self,
        session_id: &str,
        total_files: usize,
        already_done: &[ValidationResult],
        cancel: CancellationToken,
    ) -> SessionValidationStatus {
        let now = Instant::now();
        let mut snapshot = SessionValidationStatus::pending(session_id, total_files, Utc::now());
        snapshot.status = ProcessingStatus::Processing;
        snapshot.completed_files = already_done.len().min(total_files);
        snapshot.progress = percent(snapshot.completed_files, total_files);
        snapshot.summary.failed_files = already_done
            .iter()
            .filter(|r| r.status == ProcessingStatus::Failed)
            .count();
        snapshot.summary.total_findings = already_done.iter().map(ValidationResult::finding_count).sum();

        let entry = RunEntry {
            snapshot: snapshot.clone(),
            started: now,
            last_update: now,
            last_poll: None,
            cancel,
        };
        self.runs.write().await.insert(session_id.to_string(), entry);
        snapshot
    }

    /// Publish a run that failed before any file was scheduled.
    pub(crate) async fn reject(
        &self,
        session_id: &str,
        total_files: usize,
        reason: String,
    ) -> SessionValidationStatus {
        let now = Instant::now();
        let mut entry = RunEntry {
            snapshot: SessionValidationStatus::pending(session_id, total_files, Utc::now()),
            started: now,
            last_update: now,
            last_poll: None,
            cancel: CancellationToken::new(),
        };
        entry.fail(reason);
        let snapshot = entry.snapshot.clone();
        self.runs.write().await.insert(session_id.to_string(), entry);
        snapshot
    }

    pub(crate) async fn file_started(&self, session_id: &str, file_name: &str) {
        let mut runs = self.runs.write().await;
        if let Some(entry) = runs.get_mut(session_id).filter(|e| !e.snapshot.is_terminal()) {
            entry.snapshot.current_file = Some(file_name.to_string());
            entry.touch();
        }
    }

    /// Record cell progress inside a running file. Counts as an update for
    /// staleness and raises the session progress without reaching the next
    /// file boundary.
    pub(crate) async fn file_progress(&self, session_id: &str, checked: usize, total: usize) {
        let mut runs = self.runs.write().await;
        let Some(entry) = runs.get_mut(session_id).filter(|e| !e.snapshot.is_terminal()) else {
            return;
        };
        let snapshot = &mut entry.snapshot;
        if total > 0 {
            let done = snapshot.completed_files * total + checked.min(total);
            snapshot.progress = snapshot
                .progress
                .max(percent(done, snapshot.total_files * total));
        }
        entry.touch();
    }

    pub(crate) async fn file_finished(&self, session_id: &str, result: &ValidationResult) {
        let mut runs = self.runs.write().await;
        let Some(entry) = runs.get_mut(session_id).filter(|e| !e.snapshot.is_terminal()) else {
            return;
        };
        let snapshot = &mut entry.snapshot;
        snapshot.completed_files = (snapshot.completed_files + 1).min(snapshot.total_files);
        snapshot.progress = snapshot
            .progress
            .max(percent(snapshot.completed_files, snapshot.total_files));
        snapshot.summary.total_findings += result.finding_count();
        if result.status == ProcessingStatus::Failed {
            snapshot.summary.failed_files += 1;
            let reason = result.failure_reason.as_deref().unwrap_or("unknown error");
            let line = format!("{}: {reason}", result.file_name);
            snapshot.error = Some(match snapshot.error.take() {
                Some(previous) => format!("{previous}; {line}"),
                None => line,
            });
        }
        entry.touch();
    }

    /// Publish the final results. Ignored if the run is already terminal.
    pub(crate) async fn finish(&self, session_id: &str, results: Vec<ValidationResult>) {
        let mut runs = self.runs.write().await;
        let Some(entry) = runs.get_mut(session_id).filter(|e| !e.snapshot.is_terminal()) else {
            return;
        };
        if results.is_empty() {
            entry.fail("run produced no results".to_string());
            return;
        }
        let snapshot = &mut entry.snapshot;
        snapshot.status = ProcessingStatus::Completed;
        snapshot.progress = 100;
        snapshot.current_file = None;
        snapshot.completed_files = snapshot.total_files;
        snapshot.summary.failed_files = results
            .iter()
            .filter(|r| r.status == ProcessingStatus::Failed)
            .count();
        snapshot.summary.total_findings = results.iter().map(ValidationResult::finding_count).sum();
        snapshot.summary.processing_time_seconds = entry.started.elapsed().as_secs_f64();
        snapshot.results = results;
        entry.touch();
    }

    /// Mark the run failed. Ignored if the run is already terminal.
    pub(crate) async fn fail(&self, session_id: &str, reason: String) {
        let mut runs = self.runs.write().await;
        if let Some(entry) = runs.get_mut(session_id).filter(|e| !e.snapshot.is_terminal()) {
            entry.fail(reason);
        }
    }

    /// Drop the session's run, whatever its state.
    pub(crate) async fn remove(&self, session_id: &str) {
        self.runs.write().await.remove(session_id);
    }

    /// Read the current snapshot for a poller.
    ///
    /// A poll closer than `min_interval` to the previous one is refused with
    /// `RateLimited`. A non-terminal run without updates for `stale_after` is
    /// failed and its files are cancelled.
    pub(crate) async fn read(
        &self,
        session_id: &str,
        min_interval: Duration,
        stale_after: Duration,
    ) -> Result<SessionValidationStatus, EngineError> {
        let mut runs = self.runs.write().await;
        let entry = runs
            .get_mut(session_id)
            .ok_or_else(|| EngineError::not_found("validation run", session_id))?;

        let now = Instant::now();
        if let Some(previous) = entry.last_poll {
            let since = now.duration_since(previous);
            if since < min_interval {
                let wait = min_interval - since;
                return Err(EngineError::RateLimited {
                    retry_after_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                });
            }
        }
        entry.last_poll = Some(now);

        if !entry.snapshot.is_terminal() && now.duration_since(entry.last_update) > stale_after {
            tracing::warn!(session = %session_id, "validation run went stale");
            entry.cancel.cancel();
            entry.fail(STALE_REASON.to_string());
        }
        Ok(entry.snapshot.clone())
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    u8::try_from((done * 100 / total).min(100)).unwrap_or(100)
}
