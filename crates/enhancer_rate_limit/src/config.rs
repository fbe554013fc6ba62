//! Configuration structures for rate limit budgets.
//!
//! Budgets are loaded from the `[budgets.<name>]` tables of `enhancer.toml`:
//!
//! ```toml
//! default_budget = "openai-standard"
//!
//! [budgets.openai-standard]
//! max_requests = 60
//! window_ms = 60_000
//! ```

use enhancer_error::{RateLimitError, RateLimitErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Limits for one named budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests allowed in any rolling window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl RateLimitConfig {
    /// Create a budget of `max_requests` per `window_ms` milliseconds.
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    /// Window length as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Merge a partial update into this configuration.
    pub fn merged(&self, update: RateLimitConfigUpdate) -> Self {
        Self {
            max_requests: update.max_requests.unwrap_or(self.max_requests),
            window_ms: update.window_ms.unwrap_or(self.window_ms),
        }
    }

    /// Reject configurations with an empty window.
    ///
    /// `max_requests = 0` is accepted and blocks every request.
    ///
    /// # Errors
    ///
    /// Returns an error if `window_ms` is zero.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.window_ms == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidConfig(
                "window_ms must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        presets::OPENAI_STANDARD
    }
}

/// Partial update for [`RateLimitConfig`]. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfigUpdate {
    /// New request ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_requests: Option<u32>,
    /// New window length in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_ms: Option<u64>,
}

/// Built-in budgets for the OpenAI API.
pub mod presets {
    use super::RateLimitConfig;

    /// Name of the standard OpenAI budget.
    pub const OPENAI_STANDARD_NAME: &str = "openai-standard";
    /// Name of the conservative OpenAI budget.
    pub const OPENAI_CONSERVATIVE_NAME: &str = "openai-conservative";
    /// Name of the free-tier OpenAI budget.
    pub const OPENAI_FREE_NAME: &str = "openai-free";
    /// Name of the low-volume testing budget.
    pub const TESTING_NAME: &str = "testing";

    /// 60 requests per minute.
    pub const OPENAI_STANDARD: RateLimitConfig = RateLimitConfig::new(60, 60_000);
    /// 30 requests per minute.
    pub const OPENAI_CONSERVATIVE: RateLimitConfig = RateLimitConfig::new(30, 60_000);
    /// 20 requests per minute.
    pub const OPENAI_FREE: RateLimitConfig = RateLimitConfig::new(20, 60_000);
    /// 5 requests per minute.
    pub const TESTING: RateLimitConfig = RateLimitConfig::new(5, 60_000);

    /// All presets as `(name, config)` pairs.
    pub fn all() -> [(&'static str, RateLimitConfig); 4] {
        [
            (OPENAI_STANDARD_NAME, OPENAI_STANDARD),
            (OPENAI_CONSERVATIVE_NAME, OPENAI_CONSERVATIVE),
            (OPENAI_FREE_NAME, OPENAI_FREE),
            (TESTING_NAME, TESTING),
        ]
    }
}

/// The set of named budgets and which one callers use by default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BudgetsConfig {
    /// Budget used when a caller does not name one
    #[serde(default = "default_budget_name")]
    pub default_budget: String,

    /// Map of budget name to limits
    #[serde(default)]
    pub budgets: HashMap<String, RateLimitConfig>,
}

fn default_budget_name() -> String {
    presets::OPENAI_STANDARD_NAME.to_string()
}

impl Default for BudgetsConfig {
    fn default() -> Self {
        Self {
            default_budget: default_budget_name(),
            budgets: presets::all()
                .into_iter()
                .map(|(name, config)| (name.to_string(), config))
                .collect(),
        }
    }
}

impl BudgetsConfig {
    /// Check every budget and that the default budget exists.
    ///
    /// # Errors
    ///
    /// Returns the first invalid budget, or an unknown-budget error for a dangling default.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        for (name, config) in &self.budgets {
            config.validate().map_err(|e| {
                RateLimitError::new(RateLimitErrorKind::InvalidConfig(format!(
                    "budget '{}': {}",
                    name,
                    e.kind()
                )))
            })?;
        }
        if !self.budgets.contains_key(&self.default_budget) {
            return Err(RateLimitError::new(RateLimitErrorKind::UnknownBudget(
                self.default_budget.clone(),
            )));
        }
        Ok(())
    }
}
