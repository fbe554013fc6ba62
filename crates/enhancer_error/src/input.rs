//! Prompt input error types.

/// Failure to read the prompt text from a file or stdin.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Input Error: {} at line {} in {}", message, line, file)]
pub struct InputError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl InputError {
    /// Create a new InputError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use enhancer_error::InputError;
    ///
    /// let err = InputError::new("Failed to read prompt.txt: not found");
    /// assert!(err.message.contains("prompt.txt"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
