//! Engine facade: one handle over classification, the session store, and the
//! orchestrator.

use std::sync::Arc;
use std::time::Duration;

use sg_config::SgConfig;
use sg_core::entities::{
    CategorySummary, Document, FileRecord, Session, SessionValidationStatus, ValidationResult,
    summarize_categories,
};
use sg_core::responses::{SessionOverview, SessionValidation};
use sg_rules::{Classification, Classifier, KeywordClassifier, ValidatorRegistry};

use crate::error::EngineError;
use crate::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::poll::{PollPolicy, poll_until_terminal};
use crate::store::{NewFile, SessionStore};

/// A parsed upload awaiting classification.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Caller-chosen id; re-ingesting the same id is a no-op.
    pub id: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub document: Document,
}

impl Upload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, file_size: u64, document: Document) -> Self {
        Self {
            id: None,
            file_name: file_name.into(),
            file_size,
            document,
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    store: Arc<SessionStore>,
    classifier: Arc<dyn Classifier>,
    orchestrator: Orchestrator,
    poll: PollPolicy,
    idle_ttl: Duration,
}

impl Engine {
    /// Engine with the built-in rules and the keyword classifier.
    #[must_use]
    pub fn new(config: &SgConfig) -> Self {
        Self::with_parts(
            config,
            ValidatorRegistry::with_builtin_rules(&config.rules),
            Arc::new(KeywordClassifier::default()),
        )
    }

    #[must_use]
    pub fn with_parts(
        config: &SgConfig,
        registry: ValidatorRegistry,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self::assemble(
            registry,
            classifier,
            OrchestratorOptions::from_config(config),
            PollPolicy::from(&config.polling),
            Duration::from_secs(config.session.idle_ttl_secs),
        )
    }

    #[must_use]
    pub fn assemble(
        registry: ValidatorRegistry,
        classifier: Arc<dyn Classifier>,
        options: OrchestratorOptions,
        poll: PollPolicy,
        idle_ttl: Duration,
    ) -> Self {
        let store = Arc::new(SessionStore::new());
        let orchestrator = Orchestrator::new(Arc::clone(&store), Arc::new(registry), options);
        Self {
            store,
            classifier,
            orchestrator,
            poll,
            idle_ttl,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ValidatorRegistry {
        self.orchestrator.registry()
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Classify a document. Classifier failures degrade to the generic
    /// category with zero confidence.
    #[must_use]
    pub fn classify(&self, document: &Document) -> Classification {
        match self.classifier.classify(document) {
            Ok(classification) => classification,
            Err(error) => {
                tracing::warn!(file = %document.file_name, %error, "classification failed, using fallback");
                let sheets = u32::try_from(document.sheets.len()).unwrap_or(u32::MAX);
                Classification::fallback(sheets)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `EngineError::Core` if id generation fails.
    pub async fn create_session(&self) -> Result<Session, EngineError> {
        self.store.create_session().await
    }

    /// Classify an upload and add it to a session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn ingest(&self, session_id: &str, upload: Upload) -> Result<FileRecord, EngineError> {
        let classification = self.classify(&upload.document);
        self.store
            .add_file(
                session_id,
                NewFile {
                    id: upload.id,
                    file_name: upload.file_name,
                    file_size: upload.file_size,
                    category: classification.category,
                    confidence: classification.confidence,
                    metadata: Some(classification.metadata),
                    document: upload.document,
                },
            )
            .await
    }

    /// Ingest several uploads in order.
    ///
    /// # Errors
    ///
    /// Returns the first ingest error; uploads before it stay in the session.
    pub async fn ingest_many(
        &self,
        session_id: &str,
        uploads: Vec<Upload>,
    ) -> Result<Vec<FileRecord>, EngineError> {
        let mut records = Vec::with_capacity(uploads.len());
        for upload in uploads {
            records.push(self.ingest(session_id, upload).await?);
        }
        Ok(records)
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn session(&self, session_id: &str) -> Result<Session, EngineError> {
        self.store.get_session(session_id).await
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn category_summaries(
        &self,
        session_id: &str,
    ) -> Result<Vec<CategorySummary>, EngineError> {
        let session = self.store.get_session(session_id).await?;
        Ok(summarize_categories(&session.files))
    }

    /// Session snapshot together with its category summaries.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn overview(&self, session_id: &str) -> Result<SessionOverview, EngineError> {
        let session = self.store.get_session(session_id).await?;
        let categories = summarize_categories(&session.files);
        Ok(SessionOverview {
            session,
            categories,
        })
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn remove_file(&self, session_id: &str, file_id: &str) -> Result<(), EngineError> {
        self.store.remove_file(session_id, file_id).await
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn clear_files(&self, session_id: &str) -> Result<(), EngineError> {
        self.store.clear_files(session_id).await
    }

    /// Delete a session and release its validation results.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::delete_session`].
    pub async fn delete_session(&self, session_id: &str) -> Result<(), EngineError> {
        self.orchestrator.delete_session(session_id).await
    }

    /// # Errors
    ///
    /// See [`Orchestrator::validate_session`].
    pub async fn validate_session(&self, session_id: &str) -> Result<SessionValidation, EngineError> {
        self.orchestrator.validate_session(session_id).await
    }

    /// # Errors
    ///
    /// See [`Orchestrator::start_validation`].
    pub async fn start_validation(
        &self,
        session_id: &str,
    ) -> Result<SessionValidationStatus, EngineError> {
        self.orchestrator.start_validation(session_id).await
    }

    /// # Errors
    ///
    /// See [`Orchestrator::validation_status`].
    pub async fn validation_status(
        &self,
        session_id: &str,
    ) -> Result<SessionValidationStatus, EngineError> {
        self.orchestrator.validation_status(session_id).await
    }

    /// Poll the session's run with the configured policy until it is terminal.
    ///
    /// # Errors
    ///
    /// See [`poll_until_terminal`].
    pub async fn wait_for_validation<P>(
        &self,
        session_id: &str,
        on_progress: P,
    ) -> Result<SessionValidationStatus, EngineError>
    where
        P: FnMut(&SessionValidationStatus),
    {
        poll_until_terminal(
            &self.poll,
            || self.orchestrator.validation_status(session_id),
            on_progress,
        )
        .await
    }

    /// # Errors
    ///
    /// See [`Orchestrator::cancel`].
    pub async fn cancel(&self, validation_id: &str) -> Result<(), EngineError> {
        self.orchestrator.cancel(validation_id).await
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown id.
    pub async fn result(&self, validation_id: &str) -> Result<ValidationResult, EngineError> {
        self.orchestrator.result(validation_id).await
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` naming the first unknown id.
    pub async fn results<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<ValidationResult>, EngineError> {
        self.orchestrator.results(ids).await
    }

    /// Drop sessions idle for longer than the configured TTL along with their
    /// validation results.
    pub async fn evict_idle(&self) -> Vec<String> {
        self.orchestrator.evict_idle(self.idle_ttl).await
    }
}
