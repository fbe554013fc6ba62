//! Retry policy and backoff schedule.

use enhancer_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter_range};

/// Limits for one enhancement run, loaded from the `[retry]` table of `enhancer.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Failed attempts allowed before the user is offered only terminal choices
    pub max_attempts: u32,
    /// How many times a new credential may reset the attempt counter in one run
    pub max_credential_resets: u32,
    /// Delay before the first automatic retry; zero disables backoff
    pub backoff_initial_ms: u64,
    /// Ceiling for the exponential backoff delay
    pub backoff_max_ms: u64,
    /// Randomize each backoff delay between zero and its nominal value
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_credential_resets: 3,
            backoff_initial_ms: 250,
            backoff_max_ms: 8_000,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy with no backoff delays, for hosts that want to retry immediately.
    pub fn without_backoff(self) -> Self {
        Self {
            backoff_initial_ms: 0,
            ..self
        }
    }

    /// Check limits.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero or the backoff ceiling is below the
    /// initial delay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::new("retry.max_attempts must be at least 1"));
        }
        if self.backoff_max_ms < self.backoff_initial_ms {
            return Err(ConfigError::new(format!(
                "retry.backoff_max_ms ({}) must not be less than retry.backoff_initial_ms ({})",
                self.backoff_max_ms, self.backoff_initial_ms
            )));
        }
        Ok(())
    }

    /// Fresh backoff schedule for this policy.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(*self)
    }
}

/// Exponential backoff schedule: `initial`, `2 * initial`, `4 * initial`, ... capped at the
/// configured maximum.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    strategy: ExponentialBackoff,
}

impl Backoff {
    fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            strategy: Self::strategy(&policy),
        }
    }

    // tokio-retry2 yields `factor * base^n`; base 2 with factor initial/2 starts at `initial`.
    fn strategy(policy: &RetryPolicy) -> ExponentialBackoff {
        ExponentialBackoff::from_millis(2)
            .factor(policy.backoff_initial_ms / 2)
            .max_delay(Duration::from_millis(policy.backoff_max_ms))
    }

    /// Delay before the next retry.
    pub fn next_delay(&mut self) -> Duration {
        if self.policy.backoff_initial_ms == 0 {
            return Duration::ZERO;
        }
        let delay = self
            .strategy
            .next()
            .unwrap_or_else(|| Duration::from_millis(self.policy.backoff_max_ms));
        if self.policy.jitter {
            jitter_range(0.0, 1.0)(delay)
        } else {
            delay
        }
    }

    /// Start the schedule over from the initial delay.
    pub fn reset(&mut self) {
        self.strategy = Self::strategy(&self.policy);
    }
}
