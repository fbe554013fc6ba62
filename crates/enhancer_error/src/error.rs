//! Top-level error wrapper types.

use crate::{
    ConfigError, InputError, JsonError, OpenAiError, RateLimitError, RecoveryError, SettingsError,
};

/// Every error condition the enhancer surfaces.
///
/// # Examples
///
/// ```
/// use enhancer_error::{EnhancerError, InputError};
///
/// let err: EnhancerError = InputError::new("stdin closed").into();
/// assert!(format!("{}", err).contains("Input Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum EnhancerErrorKind {
    /// Prompt input error
    #[from(InputError)]
    Input(InputError),
    /// JSON serialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// OpenAI transport error
    #[from(OpenAiError)]
    OpenAi(OpenAiError),
    /// Rate limit error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Recovery collaborator error
    #[from(RecoveryError)]
    Recovery(RecoveryError),
    /// Settings validation error
    #[from(SettingsError)]
    Settings(SettingsError),
}

/// Enhancer error with kind discrimination.
///
/// # Examples
///
/// ```
/// use enhancer_error::{ConfigError, EnhancerResult};
///
/// fn might_fail() -> EnhancerResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Enhancer Error: {}", _0)]
pub struct EnhancerError(Box<EnhancerErrorKind>);

impl EnhancerError {
    /// Create a new error from a kind.
    pub fn new(kind: EnhancerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &EnhancerErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to EnhancerErrorKind
impl<T> From<T> for EnhancerError
where
    T: Into<EnhancerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for enhancer operations.
pub type EnhancerResult<T> = std::result::Result<T, EnhancerError>;
