//! Status polling cadence and rate-limit backoff.

use serde::{Deserialize, Serialize};

const fn default_interval_secs() -> u64 {
    5
}

const fn default_max_attempts() -> u32 {
    180
}

fn default_backoff_secs() -> Vec<u64> {
    vec![5, 10, 20]
}

const fn default_max_rate_limited() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Seconds between status polls.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Polls before the caller gives up with a timeout.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Waits applied after the 1st, 2nd, 3rd consecutive rate-limit response.
    #[serde(default = "default_backoff_secs")]
    pub rate_limit_backoff_secs: Vec<u64>,

    /// Consecutive rate-limit responses tolerated before aborting.
    #[serde(default = "default_max_rate_limited")]
    pub max_rate_limited: u32,

    /// Minimum gap the status endpoint enforces between polls of one session.
    /// `0` disables server-side rate limiting.
    #[serde(default)]
    pub min_poll_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_attempts: default_max_attempts(),
            rate_limit_backoff_secs: default_backoff_secs(),
            max_rate_limited: default_max_rate_limited(),
            min_poll_interval_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_fifteen_minutes_of_polling() {
        let config = PollingConfig::default();
        assert_eq!(
            u64::from(config.max_attempts) * config.interval_secs,
            15 * 60
        );
        assert_eq!(config.rate_limit_backoff_secs, vec![5, 10, 20]);
        assert_eq!(config.max_rate_limited, 3);
        assert_eq!(config.min_poll_interval_ms, 0);
    }
}
