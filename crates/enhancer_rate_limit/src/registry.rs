//! Registry of named budgets built once at startup.

use crate::{BudgetsConfig, RateLimitConfig, RateLimitStatus, RateLimiter, presets};
use enhancer_error::{RateLimitError, RateLimitErrorKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Named [`RateLimiter`] handles.
///
/// Construct one registry when the process starts and pass limiters to callers by handle.
/// Every lookup of the same name returns the same shared limiter, so concurrent enhancement
/// runs draw from one budget.
///
/// # Example
///
/// ```
/// use enhancer_rate_limit::RateLimiterRegistry;
///
/// let registry = RateLimiterRegistry::with_presets();
/// let a = registry.require("openai-free").unwrap();
/// let b = registry.require("openai-free").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiterRegistry {
    limiters: BTreeMap<String, Arc<RateLimiter>>,
    default_budget: String,
}

impl RateLimiterRegistry {
    /// Create an empty registry whose default budget is `default_budget`.
    pub fn new(default_budget: impl Into<String>) -> Self {
        Self {
            limiters: BTreeMap::new(),
            default_budget: default_budget.into(),
        }
    }

    /// Registry holding the built-in OpenAI and testing budgets.
    pub fn with_presets() -> Self {
        let mut registry = Self::new(presets::OPENAI_STANDARD_NAME);
        for (name, config) in presets::all() {
            registry
                .limiters
                .insert(name.to_string(), Arc::new(RateLimiter::new(name, config)));
        }
        registry
    }

    /// Build a registry from loaded budget configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any budget is invalid or the default budget is not defined.
    #[instrument(skip(budgets), fields(count = budgets.budgets.len()))]
    pub fn from_budgets(budgets: &BudgetsConfig) -> Result<Self, RateLimitError> {
        budgets.validate()?;
        let mut registry = Self::new(budgets.default_budget.clone());
        for (name, config) in &budgets.budgets {
            registry.register(name.clone(), *config)?;
        }
        debug!(default = %registry.default_budget, "Rate limiter registry built");
        Ok(registry)
    }

    /// Add or replace a budget.
    ///
    /// Replacing a budget starts it with an empty window; handles to the old limiter keep
    /// working but no longer share state with the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        config: RateLimitConfig,
    ) -> Result<Arc<RateLimiter>, RateLimitError> {
        config.validate()?;
        let name = name.into();
        let limiter = Arc::new(RateLimiter::new(name.clone(), config));
        self.limiters.insert(name, Arc::clone(&limiter));
        Ok(limiter)
    }

    /// Look up a budget.
    pub fn get(&self, name: &str) -> Option<Arc<RateLimiter>> {
        self.limiters.get(name).cloned()
    }

    /// Look up a budget that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitErrorKind::UnknownBudget`] if no budget has this name.
    pub fn require(&self, name: &str) -> Result<Arc<RateLimiter>, RateLimitError> {
        self.get(name).ok_or_else(|| {
            RateLimitError::new(RateLimitErrorKind::UnknownBudget(name.to_string()))
        })
    }

    /// The default budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the default budget was never registered.
    pub fn default_limiter(&self) -> Result<Arc<RateLimiter>, RateLimitError> {
        self.require(&self.default_budget)
    }

    /// Name of the default budget.
    pub fn default_budget(&self) -> &str {
        &self.default_budget
    }

    /// Budget names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.limiters.keys().map(String::as_str)
    }

    /// Status of every budget, sorted by name.
    pub fn statuses(&self) -> Vec<(String, RateLimitStatus)> {
        self.limiters
            .iter()
            .map(|(name, limiter)| (name.clone(), limiter.status()))
            .collect()
    }

    /// Number of budgets.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// Whether no budgets are registered.
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

impl Default for RateLimiterRegistry {
    fn default() -> Self {
        Self::with_presets()
    }
}
