//! The enhancement service a host builds once at startup.

use crate::EnhancerConfig;
use enhancer_error::EnhancerResult;
use enhancer_openai::{EnhancementRequest, EnhancementResult, OpenAiClient};
use enhancer_rate_limit::RateLimiterRegistry;
use enhancer_retry::{RecoveryUi, RetryCoordinator, RetrySession};
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of one [`Enhancer::enhance`] call.
#[derive(Debug, Clone)]
pub struct EnhanceOutcome {
    /// The enhancement, or `None` when the user gave up
    pub result: Option<EnhancementResult>,
    /// Attempt bookkeeping for the run
    pub session: RetrySession,
    /// Budget the run drew from
    pub budget: String,
}

/// Shared client, budgets, and retry policy.
///
/// Wrap in an `Arc` and hand the same instance to every caller; concurrent runs then draw
/// from the same budgets.
#[derive(Debug)]
pub struct Enhancer {
    client: Arc<OpenAiClient>,
    registry: RateLimiterRegistry,
    coordinator: RetryCoordinator,
}

impl Enhancer {
    /// Build the service from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration section is invalid or the HTTP client cannot be
    /// created.
    #[instrument(skip_all, fields(default_budget = %config.default_budget))]
    pub fn from_config(config: &EnhancerConfig) -> EnhancerResult<Self> {
        config.validate()?;
        let registry = RateLimiterRegistry::from_budgets(&config.budgets_config())?;
        let coordinator = RetryCoordinator::new(config.retry)?;
        let client = Arc::new(OpenAiClient::new(config.openai.clone())?);
        info!(budgets = registry.len(), "Enhancer ready");
        Ok(Self {
            client,
            registry,
            coordinator,
        })
    }

    /// Attach the initial credential.
    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        self.client.set_api_key(api_key);
        self
    }

    /// The shared OpenAI client.
    pub fn client(&self) -> &Arc<OpenAiClient> {
        &self.client
    }

    /// The budget registry.
    pub fn registry(&self) -> &RateLimiterRegistry {
        &self.registry
    }

    /// The retry coordinator.
    pub fn coordinator(&self) -> &RetryCoordinator {
        &self.coordinator
    }

    /// Enhance a prompt against a budget, asking `recovery` how to handle failures.
    ///
    /// `budget` defaults to the configured default budget.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown budget or a failing recovery surface. Enhancement
    /// failures the user gives up on are reported as `result: None`.
    #[instrument(skip(self, request, recovery, budget), fields(budget = tracing::field::Empty))]
    pub async fn enhance<R>(
        &self,
        request: &EnhancementRequest,
        budget: Option<&str>,
        recovery: &R,
    ) -> EnhancerResult<EnhanceOutcome>
    where
        R: RecoveryUi + ?Sized,
    {
        let limiter = match budget {
            Some(name) => self.registry.require(name)?,
            None => self.registry.default_limiter()?,
        };
        tracing::Span::current().record("budget", limiter.name());

        let (result, session) = self
            .coordinator
            .run_tracked(|| self.client.enhance(request), recovery, &limiter)
            .await?;

        Ok(EnhanceOutcome {
            result,
            session,
            budget: limiter.name().to_string(),
        })
    }
}
