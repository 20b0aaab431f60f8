//! Caller-side status polling with rate-limit backoff.
//!
//! Polls on a fixed interval until the run is terminal. A `RateLimited`
//! answer switches to the backoff schedule; more consecutive rate-limit
//! answers than `max_rate_limited` abort the wait, and running out of
//! attempts ends it with `Timeout`. Neither outcome says anything about the
//! run itself, which keeps going server-side.

use std::future::Future;
use std::time::Duration;

use sg_config::PollingConfig;
use sg_core::entities::SessionValidationStatus;

use crate::error::EngineError;

/// Polling cadence for [`poll_until_terminal`].
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Polls, rate-limited ones included, before giving up.
    pub max_attempts: u32,
    /// Waits after the 1st, 2nd, ... consecutive rate-limit answer. The last
    /// entry repeats if the list is shorter than `max_rate_limited`.
    pub rate_limit_backoff: Vec<Duration>,
    pub max_rate_limited: u32,
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts,
            rate_limit_backoff: config
                .rate_limit_backoff_secs
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
            max_rate_limited: config.max_rate_limited,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl PollPolicy {
    fn backoff(&self, consecutive: u32) -> Duration {
        let index = usize::try_from(consecutive.saturating_sub(1)).unwrap_or(usize::MAX);
        self.rate_limit_backoff
            .get(index)
            .or_else(|| self.rate_limit_backoff.last())
            .copied()
            .unwrap_or(self.interval)
    }
}

/// Poll `fetch` until it returns a terminal snapshot.
///
/// `on_progress` sees every non-terminal snapshot.
///
/// # Errors
///
/// Returns `EngineError::RateLimited` after too many consecutive rate-limit
/// answers, `EngineError::Timeout` when attempts run out, and any other error
/// from `fetch` unchanged.
pub async fn poll_until_terminal<F, Fut, P>(
    policy: &PollPolicy,
    mut fetch: F,
    mut on_progress: P,
) -> Result<SessionValidationStatus, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<SessionValidationStatus, EngineError>>,
    P: FnMut(&SessionValidationStatus),
{
    let mut consecutive_limited = 0u32;
    for attempt in 1..=policy.max_attempts {
        let wait = match fetch().await {
            Ok(status) if status.is_terminal() => return Ok(status),
            Ok(status) => {
                consecutive_limited = 0;
                on_progress(&status);
                policy.interval
            }
            Err(EngineError::RateLimited { retry_after_ms }) => {
                consecutive_limited += 1;
                if consecutive_limited > policy.max_rate_limited {
                    tracing::warn!(attempt, "giving up after repeated rate limiting");
                    return Err(EngineError::RateLimited { retry_after_ms });
                }
                let wait = policy.backoff(consecutive_limited);
                tracing::debug!(attempt, wait_ms = wait.as_millis(), "rate limited, backing off");
                wait
            }
            Err(error) => return Err(error),
        };
        if attempt < policy.max_attempts {
            tokio::time::sleep(wait).await;
        }
    }
    Err(EngineError::Timeout {
        attempts: policy.max_attempts,
    })
}
