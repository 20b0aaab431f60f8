//! Validation orchestrator tuning.

use serde::{Deserialize, Serialize};

const fn default_stale_after_secs() -> u64 {
    900
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Files validated in parallel. `0` sizes the pool from available
    /// parallelism.
    #[serde(default)]
    pub max_concurrent_files: usize,

    /// A run whose status has not changed for this long is reported failed.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: 0,
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl OrchestratorConfig {
    /// Worker pool size after resolving `0` to the machine's parallelism.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        if self.max_concurrent_files > 0 {
            return self.max_concurrent_files;
        }
        std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_concurrent_files, 0);
        assert_eq!(config.stale_after_secs, 900);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn explicit_worker_count_wins() {
        let config = OrchestratorConfig {
            max_concurrent_files: 3,
            ..OrchestratorConfig::default()
        };
        assert_eq!(config.worker_count(), 3);
    }
}
