//! # sg-config
//!
//! Layered configuration loading for saenggi using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SAENGGI_*` prefix, `__` as separator)
//! 2. Project-level `.saenggi/config.toml`
//! 3. User-level `~/.config/saenggi/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SAENGGI_RULES__SPACING_THRESHOLD` -> `rules.spacing_threshold`,
//! `SAENGGI_POLLING__INTERVAL_SECS` -> `polling.interval_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sg_config::SgConfig;
//!
//! let config = SgConfig::load_with_dotenv().expect("config");
//! println!("workers: {}", config.orchestrator.worker_count());
//! ```

mod error;
mod orchestrator;
mod polling;
mod report;
mod rules;
mod session;

pub use error::ConfigError;
pub use orchestrator::OrchestratorConfig;
pub use polling::PollingConfig;
pub use report::ReportConfig;
pub use rules::RulesConfig;
pub use session::SessionConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SgConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl SgConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`SgConfig::load_with_dotenv`] for `.env`
    /// support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is out of
    /// range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`SgConfig::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".saenggi/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SAENGGI_").split("__"))
    }

    /// Reject values that would stall or disable the engine.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.spacing_threshold < 2 {
            return Err(invalid(
                "rules.spacing_threshold",
                "must be at least 2 consecutive spaces",
            ));
        }
        if self.rules.byte_limit == 0 {
            return Err(invalid("rules.byte_limit", "must be positive"));
        }
        if self.polling.max_attempts == 0 {
            return Err(invalid("polling.max_attempts", "must be positive"));
        }
        if self.polling.rate_limit_backoff_secs.is_empty() {
            return Err(invalid(
                "polling.rate_limit_backoff_secs",
                "needs at least one backoff step",
            ));
        }
        if self.orchestrator.stale_after_secs == 0 {
            return Err(invalid("orchestrator.stale_after_secs", "must be positive"));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("saenggi").join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SgConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.interval_secs, 5);
        assert_eq!(config.rules.spacing_threshold, 5);
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = SgConfig::figment();
        let config: SgConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.session.idle_ttl_secs, 3600);
        assert_eq!(config.report.output_dir, "reports");
    }

    #[test]
    fn validate_rejects_single_space_threshold() {
        let mut config = SgConfig::default();
        config.rules.spacing_threshold = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rules.spacing_threshold"));
    }

    #[test]
    fn validate_rejects_empty_backoff() {
        let mut config = SgConfig::default();
        config.polling.rate_limit_backoff_secs.clear();
        assert!(config.validate().is_err());
    }
}
