//! Enhancement input and output.

use derive_getters::Getters;
use enhancer_error::SettingsError;
use std::time::Duration;

/// Shortest accepted prompt, in characters after trimming.
pub const MIN_TEXT_CHARS: usize = 3;
/// Longest accepted prompt, in characters after trimming.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// System prompt used when the caller gives no instructions.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert prompt engineer. Enhance the given prompt to make it more effective and detailed.";

/// A prompt to enhance.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct EnhancementRequest {
    /// The prompt text, trimmed
    text: String,
    /// Extra guidance placed ahead of the prompt in the user message
    instructions: Option<String>,
}

impl EnhancementRequest {
    /// Validate and wrap a prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed text is shorter than [`MIN_TEXT_CHARS`] or longer than
    /// [`MAX_TEXT_CHARS`].
    ///
    /// # Examples
    ///
    /// ```
    /// use enhancer_openai::EnhancementRequest;
    ///
    /// assert!(EnhancementRequest::new("  write a haiku  ", None).is_ok());
    /// assert!(EnhancementRequest::new("hi", None).is_err());
    /// ```
    pub fn new(text: impl AsRef<str>, instructions: Option<String>) -> Result<Self, SettingsError> {
        let text = text.as_ref().trim();
        let chars = text.chars().count();
        if chars < MIN_TEXT_CHARS {
            return Err(SettingsError::new(
                "text",
                format!("must be at least {} characters", MIN_TEXT_CHARS),
            ));
        }
        if chars > MAX_TEXT_CHARS {
            return Err(SettingsError::new(
                "text",
                format!(
                    "must be at most {} characters (got {})",
                    MAX_TEXT_CHARS, chars
                ),
            ));
        }
        Ok(Self {
            text: text.to_string(),
            instructions: instructions
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
        })
    }

    /// The user message sent to the model.
    pub fn user_prompt(&self) -> String {
        let lead = self
            .instructions
            .as_deref()
            .unwrap_or("Please enhance this prompt:");
        format!(
            "{}\n\nOriginal prompt: \"{}\"\n\nEnhanced prompt:",
            lead, self.text
        )
    }
}

/// A successful enhancement.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct EnhancementResult {
    /// The improved prompt, trimmed
    enhanced_text: String,
    /// Total tokens reported by the API, zero when absent
    tokens_used: u32,
    /// Model that produced the completion
    model: String,
    /// Wall time from send to decoded response
    processing_time: Duration,
}

impl EnhancementResult {
    pub(crate) fn new(
        enhanced_text: String,
        tokens_used: u32,
        model: String,
        processing_time: Duration,
    ) -> Self {
        Self {
            enhanced_text,
            tokens_used,
            model,
            processing_time,
        }
    }
}
