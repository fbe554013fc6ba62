//! Enhancement settings validation errors.

/// A setting value outside its accepted range.
///
/// # Examples
///
/// ```
/// use enhancer_error::SettingsError;
///
/// let err = SettingsError::new("temperature", "must be between 0.0 and 2.0");
/// assert_eq!(err.field, "temperature");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Settings Error: invalid value for '{}': {} at line {} in {}",
    field,
    reason,
    line,
    file
)]
pub struct SettingsError {
    /// The setting name
    pub field: String,
    /// Why the value was rejected
    pub reason: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl SettingsError {
    /// Create a new SettingsError at the current location.
    #[track_caller]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            field: field.into(),
            reason: reason.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
