//! Tests for the interactive retry loop.
//!
//! A scripted recovery surface answers every prompt from a queue and records what it was
//! shown. Time is paused, so backoff and rate-limit waits complete instantly while still
//! advancing the clock.

use async_trait::async_trait;
use enhancer_error::{RawFailure, RecoveryError, RecoveryErrorKind};
use enhancer_rate_limit::{RateLimitConfig, RateLimiter};
use enhancer_retry::{
    ErrorClassification, FailureKind, RecoveryUi, RetryChoice, RetryCoordinator, RetryPolicy,
    TerminalChoice,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct ScriptedRecovery {
    retry_choices: Mutex<VecDeque<RetryChoice>>,
    terminal_choices: Mutex<VecDeque<TerminalChoice>>,
    credentials: Mutex<VecDeque<Option<String>>>,
    reject_credentials: bool,
    fail_prompts: bool,
    retry_prompts: Mutex<Vec<ErrorClassification>>,
    terminal_prompts: Mutex<Vec<ErrorClassification>>,
    applied: Mutex<Vec<String>>,
    credential_requests: AtomicU32,
    settings_changes: AtomicU32,
}

impl ScriptedRecovery {
    fn with_retry_choices(self, choices: &[RetryChoice]) -> Self {
        self.retry_choices.lock().unwrap().extend(choices);
        self
    }

    fn with_terminal_choices(self, choices: &[TerminalChoice]) -> Self {
        self.terminal_choices.lock().unwrap().extend(choices);
        self
    }

    fn with_credentials(self, credentials: &[Option<&str>]) -> Self {
        self.credentials
            .lock()
            .unwrap()
            .extend(credentials.iter().map(|c| c.map(str::to_string)));
        self
    }

    fn retry_prompt_count(&self) -> usize {
        self.retry_prompts.lock().unwrap().len()
    }

    fn terminal_prompt_count(&self) -> usize {
        self.terminal_prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl RecoveryUi for ScriptedRecovery {
    async fn present_retry_choice(
        &self,
        classification: &ErrorClassification,
    ) -> Result<RetryChoice, RecoveryError> {
        if self.fail_prompts {
            return Err(RecoveryError::new(RecoveryErrorKind::InputClosed));
        }
        self.retry_prompts.lock().unwrap().push(classification.clone());
        Ok(self
            .retry_choices
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RetryChoice::Abort))
    }

    async fn present_terminal_choice(
        &self,
        classification: &ErrorClassification,
    ) -> Result<TerminalChoice, RecoveryError> {
        if self.fail_prompts {
            return Err(RecoveryError::new(RecoveryErrorKind::InputClosed));
        }
        self.terminal_prompts
            .lock()
            .unwrap()
            .push(classification.clone());
        Ok(self
            .terminal_choices
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TerminalChoice::Abort))
    }

    async fn collect_new_credential(&self) -> Result<Option<String>, RecoveryError> {
        self.credential_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.credentials.lock().unwrap().pop_front().flatten())
    }

    async fn apply_credential(&self, credential: String) -> Result<bool, RecoveryError> {
        if self.reject_credentials {
            return Ok(false);
        }
        self.applied.lock().unwrap().push(credential);
        Ok(true)
    }

    async fn collect_settings_change(&self) -> Result<(), RecoveryError> {
        self.settings_changes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Operation that replays scripted results and counts invocations.
fn scripted_operation(
    results: Vec<Result<&'static str, &'static str>>,
) -> (
    Arc<AtomicU32>,
    impl FnMut() -> std::future::Ready<Result<String, RawFailure>>,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let mut script: VecDeque<_> = results.into();
    let operation = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let next = script
            .pop_front()
            .unwrap_or(Err("script exhausted"))
            .map(str::to_string)
            .map_err(RawFailure::new);
        std::future::ready(next)
    };
    (calls, operation)
}

fn coordinator() -> RetryCoordinator {
    RetryCoordinator::new(RetryPolicy::default().without_backoff()).unwrap()
}

fn roomy_limiter() -> RateLimiter {
    RateLimiter::new("test", RateLimitConfig::new(100, 60_000))
}

#[tokio::test(start_paused = true)]
async fn test_success_on_first_attempt() {
    let recovery = ScriptedRecovery::default();
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![Ok("enhanced")]);

    let result = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert_eq!(result.as_deref(), Some("enhanced"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(recovery.retry_prompt_count(), 0);
    assert_eq!(recovery.terminal_prompt_count(), 0);
    assert_eq!(*limiter.status().used(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_goes_straight_to_terminal() {
    let recovery = ScriptedRecovery::default().with_terminal_choices(&[TerminalChoice::Abort]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![Err("401 Unauthorized")]);

    let result = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(recovery.retry_prompt_count(), 0);
    assert_eq!(recovery.terminal_prompt_count(), 1);
    let prompts = recovery.terminal_prompts.lock().unwrap();
    let shown = &prompts[0];
    assert_eq!(*shown.kind(), FailureKind::CredentialInvalid);
    assert!(!*shown.retryable());
}

#[tokio::test(start_paused = true)]
async fn test_retry_then_succeed() {
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::Retry, RetryChoice::Retry]);
    let limiter = roomy_limiter();
    let (calls, operation) =
        scripted_operation(vec![Err("Request timeout"), Err("Network error"), Ok("done")]);

    let (result, session) = coordinator()
        .run_tracked(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert_eq!(result.as_deref(), Some("done"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(*session.calls(), 3);
    assert_eq!(*session.attempt(), 2);
    assert_eq!(recovery.retry_prompt_count(), 2);
    assert_eq!(recovery.terminal_prompt_count(), 0);
    assert_eq!(*limiter.status().used(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_attempts_offer_only_terminal_choices() {
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::Retry, RetryChoice::Retry])
        .with_terminal_choices(&[TerminalChoice::Abort]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![
        Err("Request timeout"),
        Err("Request timeout"),
        Err("Request timeout"),
    ]);

    let result = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(recovery.retry_prompt_count(), 2);
    assert_eq!(recovery.terminal_prompt_count(), 1);
    let prompts = recovery.terminal_prompts.lock().unwrap();
    let shown = &prompts[0];
    assert_eq!(*shown.kind(), FailureKind::Timeout);
    assert!(*shown.retryable());
}

#[tokio::test(start_paused = true)]
async fn test_new_credential_resets_attempts() {
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::Retry, RetryChoice::Retry])
        .with_terminal_choices(&[TerminalChoice::RetryWithNewCredential])
        .with_credentials(&[Some("sk-new")]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![
        Err("Request timeout"),
        Err("Request timeout"),
        Err("Request timeout"),
        Ok("finally"),
    ]);

    let (result, session) = coordinator()
        .run_tracked(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert_eq!(result.as_deref(), Some("finally"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(*session.credential_resets(), 1);
    assert_eq!(*session.attempt(), 0);
    assert_eq!(recovery.applied.lock().unwrap().as_slice(), ["sk-new"]);
}

#[tokio::test(start_paused = true)]
async fn test_inline_credential_reconfigure() {
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::ReconfigureCredential])
        .with_credentials(&[Some("sk-inline")]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![Err("Network error"), Ok("ok")]);

    let (result, session) = coordinator()
        .run_tracked(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert_eq!(result.as_deref(), Some("ok"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*session.credential_resets(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_declined_credential_aborts() {
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::ReconfigureCredential])
        .with_credentials(&[None]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![Err("Network error"), Ok("unreached")]);

    let result = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(recovery.credential_requests.load(Ordering::SeqCst), 1);
    assert!(recovery.applied.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_credential_aborts() {
    let recovery = ScriptedRecovery::default()
        .with_terminal_choices(&[TerminalChoice::RetryWithNewCredential])
        .with_credentials(&[Some("   ")]);
    let limiter = roomy_limiter();
    let (_calls, operation) = scripted_operation(vec![Err("Invalid API key")]);

    let result = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(recovery.applied.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credential_aborts() {
    let recovery = ScriptedRecovery {
        reject_credentials: true,
        ..ScriptedRecovery::default()
    }
    .with_terminal_choices(&[TerminalChoice::RetryWithNewCredential])
    .with_credentials(&[Some("sk-bad")]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![Err("Invalid API key"), Ok("unreached")]);

    let result = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_settings_change_keeps_attempt_count() {
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::ChangeSettings, RetryChoice::ChangeSettings])
        .with_terminal_choices(&[TerminalChoice::Abort]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![
        Err("Request timeout"),
        Err("Request timeout"),
        Err("Request timeout"),
    ]);

    let (result, session) = coordinator()
        .run_tracked(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(recovery.settings_changes.load(Ordering::SeqCst), 2);
    assert_eq!(recovery.terminal_prompt_count(), 1);
    assert_eq!(*session.attempt(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_credential_resets_are_capped() {
    let policy = RetryPolicy {
        max_credential_resets: 1,
        ..RetryPolicy::default().without_backoff()
    };
    let coordinator = RetryCoordinator::new(policy).unwrap();
    let recovery = ScriptedRecovery::default()
        .with_terminal_choices(&[TerminalChoice::RetryWithNewCredential; 10])
        .with_credentials(&[Some("sk-1"), Some("sk-2"), Some("sk-3"), Some("sk-4")]);
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![Err("Unauthorized"); 10]);

    let (result, session) = coordinator
        .run_tracked(operation, &recovery, &limiter)
        .await
        .unwrap();

    // One reset, then two more credentials without resets, then the budget runs out.
    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(*session.credential_resets(), 1);
    assert_eq!(recovery.terminal_prompt_count(), 4);
    assert_eq!(recovery.credential_requests.load(Ordering::SeqCst), 3);
    assert_eq!(recovery.applied.lock().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_recovery_errors_propagate() {
    let recovery = ScriptedRecovery {
        fail_prompts: true,
        ..ScriptedRecovery::default()
    };
    let limiter = roomy_limiter();
    let (calls, operation) = scripted_operation(vec![Err("Request timeout")]);

    let err = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap_err();

    assert_eq!(*err.kind(), RecoveryErrorKind::InputClosed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_local_rate_limit_waits_before_retrying() {
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::Retry, RetryChoice::Retry]);
    let limiter = RateLimiter::new("tight", RateLimitConfig::new(1, 1_000));
    let (calls, operation) = scripted_operation(vec![Err("Request timeout"), Ok("through")]);
    let start = Instant::now();

    let result = coordinator()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert_eq!(result.as_deref(), Some("through"));
    // The denied attempt never reached the operation.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(start.elapsed() >= Duration::from_millis(1_000));

    let prompts = recovery.retry_prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert_eq!(*prompts[0].kind(), FailureKind::Timeout);
    assert_eq!(*prompts[1].kind(), FailureKind::RateLimited);
    assert_eq!(*prompts[1].retry_after(), Some(Duration::from_millis(1_000)));
}

#[tokio::test(start_paused = true)]
async fn test_local_rate_limit_counts_as_attempt() {
    let recovery = ScriptedRecovery::default().with_terminal_choices(&[TerminalChoice::Abort]);
    let limiter = RateLimiter::new("closed", RateLimitConfig::new(0, 1_000));
    let policy = RetryPolicy {
        max_attempts: 1,
        ..RetryPolicy::default().without_backoff()
    };
    let (calls, operation) = scripted_operation(vec![Ok("unreached")]);

    let result = RetryCoordinator::new(policy)
        .unwrap()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let prompts = recovery.terminal_prompts.lock().unwrap();
    let shown = &prompts[0];
    assert_eq!(*shown.kind(), FailureKind::RateLimited);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_grows_between_retries() {
    let policy = RetryPolicy {
        backoff_initial_ms: 200,
        backoff_max_ms: 5_000,
        jitter: false,
        ..RetryPolicy::default()
    };
    let recovery = ScriptedRecovery::default()
        .with_retry_choices(&[RetryChoice::Retry, RetryChoice::Retry]);
    let limiter = roomy_limiter();
    let (_calls, operation) =
        scripted_operation(vec![Err("Request timeout"), Err("Request timeout"), Ok("ok")]);
    let start = Instant::now();

    let result = RetryCoordinator::new(policy)
        .unwrap()
        .run(operation, &recovery, &limiter)
        .await
        .unwrap();

    assert!(result.is_some());
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test(start_paused = true)]
async fn test_dyn_recovery_is_accepted() {
    let recovery: Arc<dyn RecoveryUi> = Arc::new(ScriptedRecovery::default());
    let limiter = roomy_limiter();
    let (_calls, operation) = scripted_operation(vec![Ok("dyn")]);

    let result = coordinator()
        .run(operation, recovery.as_ref(), &limiter)
        .await
        .unwrap();

    assert_eq!(result.as_deref(), Some("dyn"));
}

#[test]
fn test_zero_attempt_policy_is_rejected() {
    let policy = RetryPolicy {
        max_attempts: 0,
        ..RetryPolicy::default()
    };
    assert!(RetryCoordinator::new(policy).is_err());
}
