//! Validation results by id.

use std::collections::HashMap;

use tokio::sync::RwLock;

use sg_core::entities::ValidationResult;

use crate::error::EngineError;

#[derive(Default)]
pub(crate) struct ResultBook {
    results: RwLock<HashMap<String, ValidationResult>>,
}

impl ResultBook {
    /// Insert or replace the stored copy of `result`.
    pub(crate) async fn publish(&self, result: &ValidationResult) {
        self.results
            .write()
            .await
            .insert(result.id.clone(), result.clone());
    }

    pub(crate) async fn get(&self, id: &str) -> Result<ValidationResult, EngineError> {
        self.results
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("validation result", id))
    }

    /// Results for `ids` in the given order; fails on the first unknown id.
    pub(crate) async fn get_many<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<ValidationResult>, EngineError> {
        let results = self.results.read().await;
        ids.iter()
            .map(|id| {
                results
                    .get(id.as_ref())
                    .cloned()
                    .ok_or_else(|| EngineError::not_found("validation result", id.as_ref()))
            })
            .collect()
    }

    pub(crate) async fn contains(&self, id: &str) -> bool {
        self.results.read().await.contains_key(id)
    }

    pub(crate) async fn remove_many(&self, ids: &[String]) {
        let mut results = self.results.write().await;
        for id in ids {
            results.remove(id);
        }
    }
}
