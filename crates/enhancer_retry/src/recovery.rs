//! The recovery surface the retry coordinator talks to.

use crate::ErrorClassification;
use async_trait::async_trait;
use enhancer_error::RecoveryError;

/// What the user chose after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryChoice {
    /// Try the same request again
    Retry,
    /// Open settings, then try again
    ChangeSettings,
    /// Enter a new credential, then start over with a fresh attempt count
    ReconfigureCredential,
    /// Give up
    Abort,
}

/// What the user chose once no automatic retry remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalChoice {
    /// Enter a new credential and start over
    RetryWithNewCredential,
    /// Give up
    Abort,
}

/// Host-supplied interaction used by [`RetryCoordinator`](crate::RetryCoordinator).
///
/// Implementations present choices and collect values however the host sees fit: a terminal
/// prompt, an editor notification, or a scripted answer list in tests. An `Err` from any
/// method means the surface itself failed and aborts the run.
#[async_trait]
pub trait RecoveryUi: Send + Sync {
    /// Offer retry, settings, credential, or abort after a retryable failure.
    async fn present_retry_choice(
        &self,
        classification: &ErrorClassification,
    ) -> Result<RetryChoice, RecoveryError>;

    /// Offer a new credential or abort when automatic retries are exhausted or pointless.
    async fn present_terminal_choice(
        &self,
        classification: &ErrorClassification,
    ) -> Result<TerminalChoice, RecoveryError>;

    /// Ask for a new credential. `None` means the user declined.
    async fn collect_new_credential(&self) -> Result<Option<String>, RecoveryError>;

    /// Install a credential for subsequent attempts. Returns whether it was accepted.
    async fn apply_credential(&self, credential: String) -> Result<bool, RecoveryError>;

    /// Let the user change request settings. Completes once they are done.
    async fn collect_settings_change(&self) -> Result<(), RecoveryError>;
}
