//! Validation orchestrator.
//!
//! One tokio task per file, bounded by a semaphore. The synchronous and
//! asynchronous modes share the same plan/execute path; the asynchronous mode
//! additionally publishes progress to the status board and runs the plan on a
//! detached task.
//!
//! A session's run only schedules files that are still `pending`. Files that
//! already reached a terminal status contribute their stored results, so a
//! re-run never moves a file backwards.

mod board;
mod book;
mod file_task;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use sg_config::SgConfig;
use sg_core::entities::{SessionValidationStatus, ValidationResult};
use sg_core::enums::ProcessingStatus;
use sg_core::ids::{PREFIX_VALIDATION, generate_id};
use sg_core::responses::SessionValidation;
use sg_rules::ValidatorRegistry;

pub use board::STALE_REASON;
pub use file_task::CANCELLED_REASON;

use board::StatusBoard;
use book::ResultBook;
use file_task::{FileJob, Sinks};

use crate::error::EngineError;
use crate::store::SessionStore;

/// Runtime knobs resolved from configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Files validated in parallel.
    pub workers: usize,
    /// Non-terminal runs without updates for this long are failed on read.
    pub stale_after: Duration,
    /// Minimum gap between two status reads of one session.
    pub min_poll_interval: Duration,
}

impl OrchestratorOptions {
    #[must_use]
    pub fn from_config(config: &SgConfig) -> Self {
        Self {
            workers: config.orchestrator.worker_count(),
            stale_after: Duration::from_secs(config.orchestrator.stale_after_secs),
            min_poll_interval: Duration::from_millis(config.polling.min_poll_interval_ms),
        }
    }
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self::from_config(&SgConfig::default())
    }
}

struct Inner {
    store: Arc<SessionStore>,
    registry: Arc<ValidatorRegistry>,
    options: OrchestratorOptions,
    board: StatusBoard,
    book: ResultBook,
    cancels: RwLock<HashMap<String, CancellationToken>>,
    active: RwLock<HashSet<String>>,
    /// Validation ids produced for each session.
    owned: RwLock<HashMap<String, Vec<String>>>,
}

/// Scheduled work for one session run.
struct Plan {
    session_id: String,
    jobs: Vec<FileJob>,
    /// Results of files that were already terminal.
    done: Vec<ValidationResult>,
    /// Validation ids in session file order.
    order: Vec<String>,
}

#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        store: Arc<SessionStore>,
        registry: Arc<ValidatorRegistry>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                registry,
                options,
                board: StatusBoard::default(),
                book: ResultBook::default(),
                cancels: RwLock::new(HashMap::new()),
                active: RwLock::new(HashSet::new()),
                owned: RwLock::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.inner.registry
    }

    /// Validate every pending file of a session and wait for all of them.
    ///
    /// `success` is true when every file completed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session,
    /// `EngineError::ValidationFailure` for a session without files, and
    /// `EngineError::InvalidState` when a run for the session is in flight.
    pub async fn validate_session(&self, session_id: &str) -> Result<SessionValidation, EngineError> {
        self.claim(session_id).await?;
        let planned = self.prepare(session_id, &CancellationToken::new()).await;
        let outcome = match planned {
            Ok(plan) => Ok(self.execute(plan).await),
            Err(error) => Err(error),
        };
        self.release(session_id).await;

        let results = outcome?;
        let success = results
            .iter()
            .all(|r| r.status == ProcessingStatus::Completed);
        tracing::info!(
            session = %session_id,
            files = results.len(),
            success,
            "session validated"
        );
        Ok(SessionValidation { success, results })
    }

    /// Start validating a session in the background and return the first
    /// published snapshot.
    ///
    /// A run that cannot start (no files) is published as `failed` and
    /// returned, so pollers observe it like any other terminal run.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session and
    /// `EngineError::InvalidState` when a run for the session is in flight.
    pub async fn start_validation(
        &self,
        session_id: &str,
    ) -> Result<SessionValidationStatus, EngineError> {
        self.claim(session_id).await?;
        let total = match self.inner.store.get_session(session_id).await {
            Ok(session) => session.files.len(),
            Err(error) => {
                self.release(session_id).await;
                return Err(error);
            }
        };
        let cancel = CancellationToken::new();
        let plan = match self.prepare(session_id, &cancel).await {
            Ok(plan) => plan,
            Err(error) => {
                self.release(session_id).await;
                tracing::warn!(session = %session_id, %error, "validation run rejected");
                return Ok(self
                    .inner
                    .board
                    .reject(session_id, total, error.to_string())
                    .await);
            }
        };

        let snapshot = self
            .inner
            .board
            .begin(session_id, plan.order.len(), &plan.done, cancel)
            .await;

        let this = self.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            let results = this.execute(plan).await;
            // Publish and release under one lock so a caller that saw the
            // terminal snapshot can claim the session right away.
            let mut active = this.inner.active.write().await;
            this.inner.board.finish(&session_id, results).await;
            active.remove(&session_id);
            drop(active);
            tracing::info!(session = %session_id, "background validation finished");
        });
        Ok(snapshot)
    }

    /// Current snapshot of the session's latest asynchronous run.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no run was started for the session
    /// and `EngineError::RateLimited` when polled faster than allowed.
    pub async fn validation_status(
        &self,
        session_id: &str,
    ) -> Result<SessionValidationStatus, EngineError> {
        self.inner
            .board
            .read(
                session_id,
                self.inner.options.min_poll_interval,
                self.inner.options.stale_after,
            )
            .await
    }

    /// Ask a running file validation to stop after the cell in flight.
    /// Cancelling a finished validation is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown validation id.
    pub async fn cancel(&self, validation_id: &str) -> Result<(), EngineError> {
        if let Some(token) = self.inner.cancels.read().await.get(validation_id) {
            token.cancel();
            tracing::info!(validation = %validation_id, "cancellation requested");
            return Ok(());
        }
        if self.inner.book.contains(validation_id).await {
            return Ok(());
        }
        Err(EngineError::not_found("validation result", validation_id))
    }

    /// A stored result, possibly still in progress.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown id.
    pub async fn result(&self, validation_id: &str) -> Result<ValidationResult, EngineError> {
        self.inner.book.get(validation_id).await
    }

    /// Stored results in the order of `ids`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` naming the first unknown id.
    pub async fn results<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<ValidationResult>, EngineError> {
        self.inner.book.get_many(ids).await
    }

    /// Delete a session together with its results and run snapshot.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session and
    /// `EngineError::InvalidState` while a run for the session is in flight.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), EngineError> {
        self.claim(session_id).await?;
        let deleted = self.inner.store.delete_session(session_id).await;
        if deleted.is_ok() {
            self.forget(session_id).await;
        }
        self.release(session_id).await;
        deleted
    }

    /// Evict sessions idle for longer than `ttl` and release what their runs
    /// left behind. Sessions with a run in flight are kept.
    pub async fn evict_idle(&self, ttl: Duration) -> Vec<String> {
        let evicted = {
            let active = self.inner.active.write().await;
            self.inner.store.evict_idle_except(ttl, &active).await
        };
        for session_id in &evicted {
            self.forget(session_id).await;
        }
        evicted
    }

    async fn forget(&self, session_id: &str) {
        let ids = self
            .inner
            .owned
            .write()
            .await
            .remove(session_id)
            .unwrap_or_default();
        {
            let mut cancels = self.inner.cancels.write().await;
            for id in &ids {
                if let Some(token) = cancels.remove(id) {
                    token.cancel();
                }
            }
        }
        self.inner.book.remove_many(&ids).await;
        self.inner.board.remove(session_id).await;
        tracing::debug!(session = %session_id, results = ids.len(), "released session results");
    }

    async fn claim(&self, session_id: &str) -> Result<(), EngineError> {
        if self.inner.active.write().await.insert(session_id.to_string()) {
            Ok(())
        } else {
            Err(EngineError::InvalidState(format!(
                "validation already running for session {session_id}"
            )))
        }
    }

    async fn release(&self, session_id: &str) {
        self.inner.active.write().await.remove(session_id);
    }

    /// Build the plan for a run.
    ///
    /// Documents and ids are resolved before anything is recorded, so a
    /// failed plan leaves no trace. A file removed while the plan is being
    /// committed is left out of the run.
    async fn prepare(
        &self,
        session_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Plan, EngineError> {
        let session = self.inner.store.get_session(session_id).await?;
        if session.files.is_empty() {
            return Err(EngineError::ValidationFailure(format!(
                "session {session_id} has no files"
            )));
        }

        let mut plan = Plan {
            session_id: session_id.to_string(),
            jobs: Vec::new(),
            done: Vec::new(),
            order: Vec::with_capacity(session.files.len()),
        };
        let mut staged = Vec::new();

        for file in &session.files {
            if file.status.is_terminal() {
                let stored = match file.validation_id.as_deref() {
                    Some(id) => self.inner.book.get(id).await.ok(),
                    None => None,
                };
                match stored {
                    Some(result) => {
                        plan.order.push(result.id.clone());
                        plan.done.push(result);
                    }
                    None => tracing::warn!(
                        session = %session_id,
                        file = %file.id,
                        "terminal file has no stored result"
                    ),
                }
                continue;
            }
            if file.status == ProcessingStatus::Processing {
                return Err(EngineError::InvalidState(format!(
                    "file {} is already being validated",
                    file.file_name
                )));
            }

            let document = match self.inner.store.document(session_id, &file.id).await {
                Ok(document) => document,
                Err(error) if error.is_not_found() => {
                    tracing::debug!(session = %session_id, file = %file.id, "file removed before planning");
                    continue;
                }
                Err(error) => return Err(error),
            };
            let validation_id = generate_id(PREFIX_VALIDATION)?;
            plan.order.push(validation_id.clone());
            staged.push((file, document, validation_id));
        }

        let mut owned = Vec::with_capacity(staged.len());
        for (file, document, validation_id) in staged {
            if let Err(error) = self
                .inner
                .store
                .set_validation_id(session_id, &file.id, &validation_id)
                .await
            {
                tracing::debug!(session = %session_id, file = %file.id, %error, "file removed while planning");
                plan.order.retain(|id| id != &validation_id);
                continue;
            }

            let result = ValidationResult::new(
                validation_id.clone(),
                file.file_name.clone(),
                file.category.clone(),
                document.total_cells(),
                Utc::now(),
            );
            self.inner.book.publish(&result).await;

            let token = cancel.child_token();
            self.inner
                .cancels
                .write()
                .await
                .insert(validation_id.clone(), token.clone());
            owned.push(validation_id);

            plan.jobs.push(FileJob {
                session_id: session_id.to_string(),
                file_id: file.id.clone(),
                result,
                document,
                validators: self.inner.registry.resolve(&file.category),
                cancel: token,
            });
        }
        self.inner
            .owned
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .extend(owned);

        tracing::debug!(
            session = %session_id,
            scheduled = plan.jobs.len(),
            carried = plan.done.len(),
            "validation planned"
        );
        Ok(plan)
    }

    async fn execute(&self, plan: Plan) -> Vec<ValidationResult> {
        let Plan {
            session_id,
            jobs,
            order,
            ..
        } = plan;

        let semaphore = Arc::new(Semaphore::new(self.inner.options.workers.max(1)));
        let mut tasks = JoinSet::new();
        for job in jobs {
            let this = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let session_id = job.session_id.clone();
                let validation_id = job.result.id.clone();
                this.inner
                    .board
                    .file_started(&session_id, &job.result.file_name)
                    .await;
                let sinks = Sinks {
                    store: &this.inner.store,
                    book: &this.inner.book,
                    board: &this.inner.board,
                };
                let result = file_task::validate_file(job, &sinks).await;
                this.inner.cancels.write().await.remove(&validation_id);
                this.inner.board.file_finished(&session_id, &result).await;
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                tracing::error!(session = %session_id, %error, "file task aborted");
            }
        }

        self.collect(&session_id, &order).await
    }

    /// Gather results in file order. Anything left non-terminal by an aborted
    /// task is failed here.
    async fn collect(&self, session_id: &str, order: &[String]) -> Vec<ValidationResult> {
        let mut results = Vec::with_capacity(order.len());
        for id in order {
            match self.inner.book.get(id).await {
                Ok(mut result) => {
                    if !result.status.is_terminal() {
                        if let Err(error) = result.fail("worker aborted", Utc::now()) {
                            tracing::warn!(result = %id, %error, "could not fail result");
                        }
                        self.inner.book.publish(&result).await;
                    }
                    results.push(result);
                }
                Err(error) => {
                    tracing::warn!(session = %session_id, result = %id, %error, "result missing");
                }
            }
        }
        results
    }
}
