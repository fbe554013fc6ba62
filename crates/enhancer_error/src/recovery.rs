//! Errors raised by recovery collaborators.
//!
//! Operation failures are never reported through these types. A `RecoveryError` means the
//! host-supplied recovery UI itself broke, which is why the retry coordinator lets it
//! propagate instead of classifying it.

/// Specific recovery collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RecoveryErrorKind {
    /// Reading or writing the interactive surface failed
    #[display("Recovery prompt I/O failed: {}", _0)]
    Io(String),
    /// The input stream closed while a choice was pending
    #[display("Recovery input closed before a choice was made")]
    InputClosed,
    /// Applying a collected value to the host failed
    #[display("Recovery collaborator failed: {}", _0)]
    Collaborator(String),
}

/// Recovery error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Recovery Error: {} at line {} in {}", kind, line, file)]
pub struct RecoveryError {
    kind: RecoveryErrorKind,
    line: u32,
    file: &'static str,
}

impl RecoveryError {
    /// Create a new recovery error with caller location tracking.
    #[track_caller]
    pub fn new(kind: RecoveryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RecoveryErrorKind {
        &self.kind
    }
}

impl From<std::io::Error> for RecoveryError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(RecoveryErrorKind::Io(err.to_string()))
    }
}
