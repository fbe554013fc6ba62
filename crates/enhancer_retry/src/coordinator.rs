//! The interactive retry loop.

use crate::{
    Backoff, ErrorClassification, RecoveryUi, RetryChoice, RetryPolicy, TerminalChoice, classify,
};
use derive_getters::Getters;
use enhancer_error::{AsRawFailure, ConfigError, RecoveryError};
use enhancer_rate_limit::{RateLimiter, RequestOutcome};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Bookkeeping for one run.
///
/// `attempt` counts failed attempts and is reset to zero only by an applied credential, at
/// most `max_credential_resets` times per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct RetrySession {
    /// Failed attempts since the start or the last credential reset
    attempt: u32,
    /// Ceiling for `attempt` before only terminal choices remain
    max_attempts: u32,
    /// Credential resets used so far
    credential_resets: u32,
    /// How many times the operation was actually invoked
    calls: u32,
}

impl RetrySession {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            credential_resets: 0,
            calls: 0,
        }
    }

    /// Whether the attempt budget is spent.
    pub fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

enum Decision {
    /// Try again after the backoff delay
    Retry,
    /// Try again immediately with a fresh backoff schedule
    Restart,
    Abort,
}

/// Drives one enhancement request through rate limiting, classification, and user-directed
/// recovery.
///
/// Each run owns its own [`RetrySession`]; the coordinator itself holds only the policy, so one
/// coordinator can serve many concurrent runs.
#[derive(Debug, Clone)]
pub struct RetryCoordinator {
    policy: RetryPolicy,
}

impl RetryCoordinator {
    /// Create a coordinator.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid.
    pub fn new(policy: RetryPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The active policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds or the user gives up.
    ///
    /// Before every attempt a request is recorded against `limiter`. A denied request never
    /// reaches the operation; it is treated as a rate-limited failure whose wait comes from the
    /// limiter. Operation failures are classified and the user is asked how to proceed:
    ///
    /// * retryable and under `max_attempts`: retry, change settings, new credential, or abort
    /// * otherwise: new credential or abort
    ///
    /// Retries wait for the larger of the backoff delay and any wait hint. A credential that
    /// the host accepts resets the attempt counter and retries immediately.
    ///
    /// Returns `Ok(Some(value))` on success and `Ok(None)` when the run was abandoned.
    ///
    /// # Errors
    ///
    /// Only errors from `recovery` itself are returned; operation failures never escape.
    pub async fn run<T, E, F, Fut, R>(
        &self,
        operation: F,
        recovery: &R,
        limiter: &RateLimiter,
    ) -> Result<Option<T>, RecoveryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: AsRawFailure + Display,
        R: RecoveryUi + ?Sized,
    {
        let (value, _session) = self.run_tracked(operation, recovery, limiter).await?;
        Ok(value)
    }

    /// Like [`RetryCoordinator::run`], also returning the final session bookkeeping.
    ///
    /// # Errors
    ///
    /// Only errors from `recovery` itself are returned.
    #[instrument(
        skip_all,
        fields(budget = %limiter.name(), max_attempts = self.policy.max_attempts)
    )]
    pub async fn run_tracked<T, E, F, Fut, R>(
        &self,
        mut operation: F,
        recovery: &R,
        limiter: &RateLimiter,
    ) -> Result<(Option<T>, RetrySession), RecoveryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: AsRawFailure + Display,
        R: RecoveryUi + ?Sized,
    {
        let mut session = RetrySession::new(self.policy.max_attempts);
        let mut backoff = self.policy.backoff();

        loop {
            let classification = match limiter.record_request() {
                RequestOutcome::Limited { wait_time, .. } => {
                    debug!(
                        wait_ms = wait_time.as_millis() as u64,
                        "Request blocked by client rate limit"
                    );
                    ErrorClassification::local_rate_limit(limiter.name(), wait_time)
                }
                RequestOutcome::Allowed { remaining, .. } => {
                    session.calls += 1;
                    debug!(call = session.calls, remaining, "Invoking operation");
                    match operation().await {
                        Ok(value) => {
                            info!(
                                calls = session.calls,
                                attempt = session.attempt,
                                "Operation succeeded"
                            );
                            return Ok((Some(value), session));
                        }
                        Err(e) => {
                            warn!(error = %e, "Operation failed");
                            classify(&e.raw_failure())
                        }
                    }
                }
            };

            session.attempt += 1;
            debug!(
                kind = %classification.kind(),
                retryable = *classification.retryable(),
                attempt = session.attempt,
                "Failure classified"
            );

            match self
                .decide(&mut session, &classification, recovery)
                .await?
            {
                Decision::Retry => {
                    let delay = retry_delay(&classification, &mut backoff);
                    if !delay.is_zero() {
                        debug!(delay_ms = delay.as_millis() as u64, "Backing off");
                        tokio::time::sleep(delay).await;
                    }
                }
                Decision::Restart => backoff.reset(),
                Decision::Abort => {
                    info!(
                        calls = session.calls,
                        attempt = session.attempt,
                        kind = %classification.kind(),
                        "Run abandoned"
                    );
                    return Ok((None, session));
                }
            }
        }
    }

    async fn decide<R>(
        &self,
        session: &mut RetrySession,
        classification: &ErrorClassification,
        recovery: &R,
    ) -> Result<Decision, RecoveryError>
    where
        R: RecoveryUi + ?Sized,
    {
        if !*classification.retryable() || session.exhausted() {
            return match recovery.present_terminal_choice(classification).await? {
                TerminalChoice::RetryWithNewCredential => {
                    self.refresh_credential(session, recovery).await
                }
                TerminalChoice::Abort => Ok(Decision::Abort),
            };
        }

        match recovery.present_retry_choice(classification).await? {
            RetryChoice::Retry => Ok(Decision::Retry),
            RetryChoice::ChangeSettings => {
                recovery.collect_settings_change().await?;
                Ok(Decision::Retry)
            }
            RetryChoice::ReconfigureCredential => self.refresh_credential(session, recovery).await,
            RetryChoice::Abort => Ok(Decision::Abort),
        }
    }

    async fn refresh_credential<R>(
        &self,
        session: &mut RetrySession,
        recovery: &R,
    ) -> Result<Decision, RecoveryError>
    where
        R: RecoveryUi + ?Sized,
    {
        let can_reset = session.credential_resets < self.policy.max_credential_resets;
        if !can_reset && session.exhausted() {
            warn!(
                resets = session.credential_resets,
                "Credential reset limit reached"
            );
            return Ok(Decision::Abort);
        }

        let Some(credential) = recovery
            .collect_new_credential()
            .await?
            .filter(|c| !c.trim().is_empty())
        else {
            debug!("No credential supplied");
            return Ok(Decision::Abort);
        };

        if !recovery.apply_credential(credential).await? {
            warn!("Credential was not applied");
            return Ok(Decision::Abort);
        }

        if can_reset {
            session.credential_resets += 1;
            session.attempt = 0;
            info!(
                resets = session.credential_resets,
                "Credential updated, attempts reset"
            );
            Ok(Decision::Restart)
        } else {
            debug!("Credential updated without resetting attempts");
            Ok(Decision::Retry)
        }
    }
}

fn retry_delay(classification: &ErrorClassification, backoff: &mut Backoff) -> Duration {
    let hint = classification.retry_after().unwrap_or_default();
    backoff.next_delay().max(hint)
}

impl Default for RetryCoordinator {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
        }
    }
}
