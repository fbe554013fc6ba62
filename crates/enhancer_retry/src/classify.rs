//! Failure classification.
//!
//! Maps a [`RawFailure`] onto one of eight kinds by ordered keyword and code matching; the
//! first matching rule wins. Message matching ignores case. Classification is a pure
//! function: the same failure always yields the same kind.

use derive_getters::Getters;
use enhancer_error::{RawFailure, codes};
use std::time::Duration;
use strum::{Display, EnumIter, IntoStaticStr};

/// The failure taxonomy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    /// No credential is configured
    CredentialMissing,
    /// The provider rejected the credential
    CredentialInvalid,
    /// The provider could not be reached
    NetworkUnreachable,
    /// The request did not finish in time
    Timeout,
    /// The account is out of quota or has a billing problem
    QuotaExceeded,
    /// Too many requests, either at the provider or against the local budget
    RateLimited,
    /// The provider rejected the request parameters
    MalformedRequest,
    /// Anything else
    Unknown,
}

impl FailureKind {
    /// Whether another attempt can reasonably succeed without user intervention.
    ///
    /// Unknown failures are retryable so unrecognized transient problems still get a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            FailureKind::Timeout
            | FailureKind::RateLimited
            | FailureKind::NetworkUnreachable
            | FailureKind::Unknown => true,
            FailureKind::CredentialMissing
            | FailureKind::CredentialInvalid
            | FailureKind::QuotaExceeded
            | FailureKind::MalformedRequest => false,
        }
    }

    /// One-line description shown to the user.
    pub fn summary(&self) -> &'static str {
        match self {
            FailureKind::CredentialMissing => "No API key configured",
            FailureKind::CredentialInvalid => "Invalid or missing API key",
            FailureKind::NetworkUnreachable => "Network connection failed",
            FailureKind::Timeout => "Request timed out",
            FailureKind::QuotaExceeded => "API quota exceeded or billing issue",
            FailureKind::RateLimited => "Rate limit exceeded",
            FailureKind::MalformedRequest => "Invalid request parameters",
            FailureKind::Unknown => "Unexpected error",
        }
    }

    /// Advisory remedy.
    pub fn suggestion(&self) -> &'static str {
        match self {
            FailureKind::CredentialMissing => "Set your OpenAI API key and try again",
            FailureKind::CredentialInvalid => "Please check your OpenAI API key in settings",
            FailureKind::NetworkUnreachable => "Check your internet connection and try again",
            FailureKind::Timeout => {
                "Try increasing the timeout in settings or check your internet connection"
            }
            FailureKind::QuotaExceeded => "Check your OpenAI account usage and billing settings",
            FailureKind::RateLimited => "Please wait a moment before trying again",
            FailureKind::MalformedRequest => "Please check your settings and try again",
            FailureKind::Unknown => "Please try again or contact support if the issue persists",
        }
    }

    /// Whether supplying a new credential is a sensible remedy.
    pub fn offers_credential_fix(&self) -> bool {
        matches!(
            self,
            FailureKind::CredentialMissing | FailureKind::CredentialInvalid
        )
    }
}

/// A classified failure.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ErrorClassification {
    /// Taxonomy entry
    kind: FailureKind,
    /// Derived from `kind`
    retryable: bool,
    /// Advisory remedy, derived from `kind`
    #[getter(skip)]
    suggestion: &'static str,
    /// The original failure message
    message: String,
    /// How long to wait before the next attempt, when known
    retry_after: Option<Duration>,
}

impl ErrorClassification {
    /// Classification for a given kind and original message.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            retryable: kind.is_retryable(),
            suggestion: kind.suggestion(),
            message: message.into(),
            retry_after: None,
        }
    }

    /// A local budget denial that clears after `wait`.
    pub fn local_rate_limit(budget: &str, wait: Duration) -> Self {
        let secs = wait.as_millis().div_ceil(1000);
        Self::new(
            FailureKind::RateLimited,
            format!(
                "Client rate limit for '{}' exceeded, retry in {}s",
                budget, secs
            ),
        )
        .with_retry_after(wait)
    }

    /// Advisory remedy, derived from `kind`.
    pub fn suggestion(&self) -> &'static str {
        self.suggestion
    }

    /// Attach a wait hint.
    pub fn with_retry_after(mut self, wait: Duration) -> Self {
        self.retry_after = Some(wait);
        self
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn code_is(code: Option<&str>, candidates: &[&str]) -> bool {
    code.is_some_and(|code| {
        candidates
            .iter()
            .any(|candidate| code.eq_ignore_ascii_case(candidate))
    })
}

/// Classify a raw failure.
///
/// # Examples
///
/// ```
/// use enhancer_error::RawFailure;
/// use enhancer_retry::{FailureKind, classify};
///
/// let c = classify(&RawFailure::new("Request timeout"));
/// assert_eq!(*c.kind(), FailureKind::Timeout);
/// assert!(*c.retryable());
/// ```
pub fn classify(failure: &RawFailure) -> ErrorClassification {
    let message = failure.message().to_lowercase();
    let code = failure.code();

    let kind = if code_is(code, &[codes::API_KEY_MISSING]) {
        FailureKind::CredentialMissing
    } else if contains_any(&message, &["api key", "unauthorized", "credential"]) {
        FailureKind::CredentialInvalid
    } else if contains_any(&message, &["timeout", "timed out"]) || code_is(code, &[codes::ETIMEDOUT])
    {
        FailureKind::Timeout
    } else if contains_any(&message, &["quota", "billing", "insufficient_quota"]) {
        FailureKind::QuotaExceeded
    } else if contains_any(&message, &["rate limit", "too many requests"]) {
        FailureKind::RateLimited
    } else if code_is(code, &[codes::ENOTFOUND, codes::ECONNREFUSED])
        || message.contains("network")
    {
        FailureKind::NetworkUnreachable
    } else if contains_any(&message, &["invalid_request", "bad request"]) {
        FailureKind::MalformedRequest
    } else {
        FailureKind::Unknown
    };

    ErrorClassification::new(kind, failure.message())
}
