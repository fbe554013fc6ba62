//! OpenAI transport error types and their failure mapping.

use crate::{AsRawFailure, RawFailure, codes};

/// OpenAI-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum OpenAiErrorKind {
    /// No API key has been configured
    #[display("OpenAI API key is not configured")]
    MissingApiKey,
    /// Failed to build the HTTP client
    #[display("Failed to create OpenAI client: {}", _0)]
    ClientCreation(String),
    /// Non-success HTTP status with the response body
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Error message or body
        message: String,
    },
    /// The request exceeded the configured timeout
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// The connection could not be established
    #[display("Connection failed: {}", _0)]
    Connect(String),
    /// Any other transport failure
    #[display("Request failed: {}", _0)]
    Request(String),
    /// The completion contained no text
    #[display("Empty response from API")]
    EmptyResponse,
    /// The response body could not be decoded
    #[display("Failed to decode response: {}", _0)]
    Decode(String),
}

impl OpenAiErrorKind {
    /// Reduce this condition to the message/code shape used for classification.
    pub fn raw_failure(&self) -> RawFailure {
        match self {
            OpenAiErrorKind::MissingApiKey => {
                RawFailure::new("API key is not configured").with_code(codes::API_KEY_MISSING)
            }
            OpenAiErrorKind::HttpStatus {
                status_code,
                message,
            } => status_failure(*status_code, message),
            OpenAiErrorKind::Timeout(msg) => {
                RawFailure::new(format!("request timeout: {}", msg)).with_code(codes::ETIMEDOUT)
            }
            OpenAiErrorKind::Connect(msg) => {
                RawFailure::new(format!("network connection failed: {}", msg))
                    .with_code(codes::ECONNREFUSED)
            }
            OpenAiErrorKind::Request(msg) => {
                RawFailure::new(format!("network request failed: {}", msg))
            }
            other => RawFailure::new(other.to_string()),
        }
    }
}

fn status_failure(status_code: u16, message: &str) -> RawFailure {
    match status_code {
        401 | 403 => RawFailure::new(format!("Unauthorized (HTTP {}): {}", status_code, message)),
        429 if message.to_lowercase().contains("insufficient_quota") => {
            RawFailure::new(format!("insufficient_quota (HTTP 429): {}", message))
        }
        // Provider text can mention billing or keys; keep only the structured tags.
        429 => RawFailure::new(format!("rate limit exceeded (HTTP 429){}", tags(message))),
        400 => RawFailure::new(format!("bad request (HTTP 400): {}", message)),
        408 | 504 => RawFailure::new(format!(
            "gateway timeout (HTTP {}){}",
            status_code,
            tags(message)
        ))
        .with_code(codes::ETIMEDOUT),
        _ => RawFailure::new(format!("HTTP {}: {}", status_code, message)),
    }
}

/// The trailing `[type, code]` suffix of an API error summary, if any.
fn tags(message: &str) -> &str {
    match message.rfind(" [") {
        Some(start) if message.ends_with(']') => &message[start..],
        _ => "",
    }
}

/// OpenAI error with source location tracking.
///
/// # Examples
///
/// ```
/// use enhancer_error::{OpenAiError, OpenAiErrorKind};
///
/// let err = OpenAiError::new(OpenAiErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("API key"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("OpenAI Error: {} at line {} in {}", kind, line, file)]
pub struct OpenAiError {
    /// The kind of error that occurred
    pub kind: OpenAiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl OpenAiError {
    /// Create a new OpenAiError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: OpenAiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl AsRawFailure for OpenAiError {
    fn raw_failure(&self) -> RawFailure {
        self.kind.raw_failure()
    }
}
