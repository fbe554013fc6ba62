//! The narrow failure shape that classification works against.

use std::fmt;

/// Well-known failure codes attached by transport adapters.
pub mod codes {
    /// No credential is configured at all.
    pub const API_KEY_MISSING: &str = "API_KEY_MISSING";
    /// The request did not complete before the transport deadline.
    pub const ETIMEDOUT: &str = "ETIMEDOUT";
    /// The host name could not be resolved.
    pub const ENOTFOUND: &str = "ENOTFOUND";
    /// The remote end refused or dropped the connection.
    pub const ECONNREFUSED: &str = "ECONNREFUSED";
}

/// A failure reduced to a message and an optional machine-readable code.
///
/// Transport adapters build these at the edge so that the classifier only ever sees one
/// known shape instead of arbitrary error types.
///
/// # Examples
///
/// ```
/// use enhancer_error::{RawFailure, codes};
///
/// let failure = RawFailure::new("getaddrinfo failed").with_code(codes::ENOTFOUND);
/// assert_eq!(failure.code(), Some("ENOTFOUND"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Error)]
pub struct RawFailure {
    message: String,
    code: Option<String>,
}

impl RawFailure {
    /// Create a failure with a message and no code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attach a failure code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The human-readable failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The failure code, if the transport reported one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl fmt::Display for RawFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Adapter from a concrete error type to a [`RawFailure`].
///
/// Implemented by every error an enhancement operation can return, so the retry
/// coordinator can classify failures without knowing the transport.
pub trait AsRawFailure {
    /// Reduce this error to its message and code.
    fn raw_failure(&self) -> RawFailure;
}

impl AsRawFailure for RawFailure {
    fn raw_failure(&self) -> RawFailure {
        self.clone()
    }
}
