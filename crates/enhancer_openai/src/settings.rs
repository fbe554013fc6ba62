//! Request settings for the OpenAI transport.
//!
//! Loaded from the `[openai]` table of `enhancer.toml` and editable at runtime through
//! [`SettingsUpdate`]. Every change is validated before it is applied.

use enhancer_error::SettingsError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default chat-completions endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Accepted timeout range in milliseconds.
pub const TIMEOUT_RANGE_MS: (u64, u64) = (5_000, 120_000);
/// Accepted temperature range.
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
/// Accepted max-token range.
pub const MAX_TOKENS_RANGE: (u32, u32) = (100, 4_000);

/// Settings applied to every enhancement request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// API root, without a trailing `/chat/completions`
    pub base_url: String,
    /// Chat model name
    pub model: String,
    /// Completion token ceiling
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1_000,
            temperature: 0.7,
            timeout_ms: 30_000,
        }
    }
}

impl OpenAiSettings {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.base_url.trim().is_empty() {
            return Err(SettingsError::new("base_url", "must not be empty"));
        }
        validate_model(&self.model)?;
        validate_max_tokens(self.max_tokens)?;
        validate_temperature(self.temperature)?;
        validate_timeout(self.timeout_ms)?;
        Ok(())
    }

    /// Apply a partial update, returning the validated result without modifying `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if any updated field is out of range.
    pub fn merged(&self, update: &SettingsUpdate) -> Result<Self, SettingsError> {
        let merged = Self {
            base_url: self.base_url.clone(),
            model: update.model.clone().unwrap_or_else(|| self.model.clone()),
            max_tokens: update.max_tokens.unwrap_or(self.max_tokens),
            temperature: update.temperature.unwrap_or(self.temperature),
            timeout_ms: update.timeout_ms.unwrap_or(self.timeout_ms),
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Partial settings change. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SettingsUpdate {
    /// New model name
    pub model: Option<String>,
    /// New completion token ceiling
    pub max_tokens: Option<u32>,
    /// New sampling temperature
    pub temperature: Option<f32>,
    /// New timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

impl SettingsUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.max_tokens.is_none()
            && self.temperature.is_none()
            && self.timeout_ms.is_none()
    }
}

/// Reject empty model names.
///
/// # Errors
///
/// Returns an error if the name is blank.
pub fn validate_model(model: &str) -> Result<(), SettingsError> {
    if model.trim().is_empty() {
        return Err(SettingsError::new("model", "must not be empty"));
    }
    Ok(())
}

/// Check the completion token ceiling.
///
/// # Errors
///
/// Returns an error if the value is outside [`MAX_TOKENS_RANGE`].
pub fn validate_max_tokens(max_tokens: u32) -> Result<(), SettingsError> {
    let (min, max) = MAX_TOKENS_RANGE;
    if !(min..=max).contains(&max_tokens) {
        return Err(SettingsError::new(
            "max_tokens",
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Check the sampling temperature.
///
/// # Errors
///
/// Returns an error if the value is outside [`TEMPERATURE_RANGE`] or not a number.
pub fn validate_temperature(temperature: f32) -> Result<(), SettingsError> {
    let (min, max) = TEMPERATURE_RANGE;
    if !(min..=max).contains(&temperature) {
        return Err(SettingsError::new(
            "temperature",
            format!("must be between {:.1} and {:.1}", min, max),
        ));
    }
    Ok(())
}

/// Check the request timeout.
///
/// # Errors
///
/// Returns an error if the value is outside [`TIMEOUT_RANGE_MS`].
pub fn validate_timeout(timeout_ms: u64) -> Result<(), SettingsError> {
    let (min, max) = TIMEOUT_RANGE_MS;
    if !(min..=max).contains(&timeout_ms) {
        return Err(SettingsError::new(
            "timeout_ms",
            format!("must be between {} and {} seconds", min / 1_000, max / 1_000),
        ));
    }
    Ok(())
}
