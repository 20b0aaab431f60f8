//! In-memory session store.
//!
//! Session lookup goes through one outer map; every session then has its own
//! lock, so mutations of one session's file set are serialized while other
//! sessions proceed independently. Parsed documents live next to their file
//! records because the orchestrator needs them and the exchange types do not
//! carry cell data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use sg_core::entities::{ClassificationMetadata, Document, FileRecord, Session};
use sg_core::enums::ProcessingStatus;
use sg_core::errors::CoreError;
use sg_core::ids::{PREFIX_FILE, PREFIX_SESSION, generate_id};

use crate::error::EngineError;

/// A classified upload ready to be stored.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Caller-chosen id for idempotent re-adds; generated when `None`.
    pub id: Option<String>,
    pub file_name: String,
    pub file_size: u64,
    pub category: String,
    pub confidence: f64,
    pub metadata: Option<ClassificationMetadata>,
    pub document: Document,
}

struct SessionEntry {
    session: Session,
    documents: HashMap<String, Arc<Document>>,
}

struct SessionSlot {
    entry: RwLock<SessionEntry>,
    /// Unix millis of the last access.
    last_touched: AtomicI64,
}

impl SessionSlot {
    fn touch(&self) {
        self.last_touched
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionSlot>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, session_id: &str) -> Result<Arc<SessionSlot>, EngineError> {
        let slot = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("session", session_id))?;
        slot.touch();
        Ok(slot)
    }

    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Core` if id generation fails.
    pub async fn create_session(&self) -> Result<Session, EngineError> {
        let session = Session {
            id: generate_id(PREFIX_SESSION)?,
            created_at: Utc::now(),
            files: Vec::new(),
        };
        let slot = Arc::new(SessionSlot {
            entry: RwLock::new(SessionEntry {
                session: session.clone(),
                documents: HashMap::new(),
            }),
            last_touched: AtomicI64::new(session.created_at.timestamp_millis()),
        });
        self.sessions.write().await.insert(session.id.clone(), slot);
        tracing::debug!(session = %session.id, "created session");
        Ok(session)
    }

    /// Append a file to a session. Re-adding an id that is already present
    /// returns the stored record unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn add_file(&self, session_id: &str, file: NewFile) -> Result<FileRecord, EngineError> {
        let slot = self.slot(session_id).await?;
        let mut entry = slot.entry.write().await;

        if let Some(existing) = file
            .id
            .as_deref()
            .and_then(|id| entry.session.file(id))
        {
            return Ok(existing.clone());
        }

        let id = match file.id {
            Some(id) => id,
            None => generate_id(PREFIX_FILE)?,
        };
        let record = FileRecord::new(
            id,
            file.file_name,
            file.file_size,
            file.category,
            file.confidence,
            file.metadata,
        );
        entry
            .documents
            .insert(record.id.clone(), Arc::new(file.document));
        entry.session.files.push(record.clone());
        tracing::debug!(
            session = %session_id,
            file = %record.id,
            category = %record.category,
            "added file"
        );
        Ok(record)
    }

    /// Snapshot of a session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn get_session(&self, session_id: &str) -> Result<Session, EngineError> {
        let slot = self.slot(session_id).await?;
        let entry = slot.entry.read().await;
        Ok(entry.session.clone())
    }

    /// Remove one file. Removing a file that is not there succeeds.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn remove_file(&self, session_id: &str, file_id: &str) -> Result<(), EngineError> {
        let slot = self.slot(session_id).await?;
        let mut entry = slot.entry.write().await;
        entry.session.files.retain(|f| f.id != file_id);
        entry.documents.remove(file_id);
        Ok(())
    }

    /// Remove every file, keeping the session itself.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn clear_files(&self, session_id: &str) -> Result<(), EngineError> {
        let slot = self.slot(session_id).await?;
        let mut entry = slot.entry.write().await;
        entry.session.files.clear();
        entry.documents.clear();
        Ok(())
    }

    /// Drop a session and its documents.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), EngineError> {
        if self.sessions.write().await.remove(session_id).is_none() {
            return Err(EngineError::not_found("session", session_id));
        }
        tracing::debug!(session = %session_id, "deleted session");
        Ok(())
    }

    /// Parsed document for a file.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session or file.
    pub async fn document(
        &self,
        session_id: &str,
        file_id: &str,
    ) -> Result<Arc<Document>, EngineError> {
        let slot = self.slot(session_id).await?;
        let entry = slot.entry.read().await;
        entry
            .documents
            .get(file_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("file", file_id))
    }

    /// Move a file along the processing state machine. Setting the status a
    /// file already has is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session or file, and
    /// `EngineError::Core(InvalidTransition)` for a disallowed move.
    pub async fn update_file_status(
        &self,
        session_id: &str,
        file_id: &str,
        next: ProcessingStatus,
    ) -> Result<FileRecord, EngineError> {
        let slot = self.slot(session_id).await?;
        let mut entry = slot.entry.write().await;
        let record = entry
            .session
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| EngineError::not_found("file", file_id))?;

        if record.status != next {
            if !record.status.can_transition_to(next) {
                return Err(CoreError::InvalidTransition {
                    entity_type: "file".to_string(),
                    id: file_id.to_string(),
                    from: record.status.to_string(),
                    to: next.to_string(),
                }
                .into());
            }
            record.status = next;
        }
        Ok(record.clone())
    }

    /// Link a file to the validation result produced for it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` for an unknown session or file.
    pub async fn set_validation_id(
        &self,
        session_id: &str,
        file_id: &str,
        validation_id: &str,
    ) -> Result<(), EngineError> {
        let slot = self.slot(session_id).await?;
        let mut entry = slot.entry.write().await;
        let record = entry
            .session
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| EngineError::not_found("file", file_id))?;
        record.validation_id = Some(validation_id.to_string());
        Ok(())
    }

    /// Drop sessions untouched for longer than `ttl`. Returns the evicted ids.
    pub async fn evict_idle(&self, ttl: Duration) -> Vec<String> {
        self.evict_idle_except(ttl, &HashSet::new()).await
    }

    /// Like [`Self::evict_idle`], but never evicts a session in `keep`.
    pub async fn evict_idle_except(&self, ttl: Duration, keep: &HashSet<String>) -> Vec<String> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff = Utc::now().timestamp_millis().saturating_sub(ttl_ms);

        let mut sessions = self.sessions.write().await;
        let mut evicted: Vec<String> = sessions
            .iter()
            .filter(|(id, slot)| {
                !keep.contains(*id) && slot.last_touched.load(Ordering::Relaxed) < cutoff
            })
            .map(|(id, _)| id.clone())
            .collect();
        evicted.sort();
        for id in &evicted {
            sessions.remove(id);
        }
        if !evicted.is_empty() {
            tracing::info!(count = evicted.len(), "evicted idle sessions");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sg_core::entities::Sheet;

    use super::*;

    fn upload(id: Option<&str>, name: &str) -> NewFile {
        NewFile {
            id: id.map(str::to_string),
            file_name: name.to_string(),
            file_size: 1,
            category: "generic".to_string(),
            confidence: 0.5,
            metadata: None,
            document: Document::new(name, vec![Sheet::new("S", vec![vec!["x".into()]])]),
        }
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = SessionStore::new();
        let err = store.get_session("ses-missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(
            store
                .add_file("ses-missing", upload(None, "a"))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(store.clear_files("ses-missing").await.is_err());
        assert!(store.delete_session("ses-missing").await.is_err());
    }

    #[tokio::test]
    async fn add_file_is_idempotent_on_id() {
        let store = SessionStore::new();
        let session = store.create_session().await.unwrap();
        let first = store
            .add_file(&session.id, upload(Some("fil-1"), "a.xlsx"))
            .await
            .unwrap();
        let again = store
            .add_file(&session.id, upload(Some("fil-1"), "renamed.xlsx"))
            .await
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(store.get_session(&session.id).await.unwrap().files.len(), 1);
    }

    #[tokio::test]
    async fn removing_absent_file_succeeds() {
        let store = SessionStore::new();
        let session = store.create_session().await.unwrap();
        store.add_file(&session.id, upload(Some("fil-1"), "a")).await.unwrap();
        store.remove_file(&session.id, "fil-1").await.unwrap();
        store.remove_file(&session.id, "fil-1").await.unwrap();
        assert!(store.get_session(&session.id).await.unwrap().files.is_empty());
        assert!(store.document(&session.id, "fil-1").await.is_err());
    }

    #[tokio::test]
    async fn status_transitions_follow_the_state_machine() {
        let store = SessionStore::new();
        let session = store.create_session().await.unwrap();
        store.add_file(&session.id, upload(Some("fil-1"), "a")).await.unwrap();

        let err = store
            .update_file_status(&session.id, "fil-1", ProcessingStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidTransition { .. })
        ));

        store
            .update_file_status(&session.id, "fil-1", ProcessingStatus::Processing)
            .await
            .unwrap();
        let done = store
            .update_file_status(&session.id, "fil-1", ProcessingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, ProcessingStatus::Completed);

        // Terminal is sticky.
        assert!(
            store
                .update_file_status(&session.id, "fil-1", ProcessingStatus::Processing)
                .await
                .is_err()
        );
        store
            .update_file_status(&session.id, "fil-1", ProcessingStatus::Completed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let store = SessionStore::new();
        let session = store.create_session().await.unwrap();
        assert!(store.evict_idle(Duration::from_secs(60)).await.is_empty());

        tokio::time::sleep(Duration::from_millis(20)).await;
        let evicted = store.evict_idle(Duration::from_millis(5)).await;
        assert_eq!(evicted, vec![session.id.clone()]);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn kept_sessions_survive_eviction() {
        let store = SessionStore::new();
        let busy = store.create_session().await.unwrap();
        let idle = store.create_session().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let keep = HashSet::from([busy.id.clone()]);
        let evicted = store.evict_idle_except(Duration::from_millis(5), &keep).await;
        assert_eq!(evicted, vec![idle.id]);
        assert!(store.get_session(&busy.id).await.is_ok());
    }
}
