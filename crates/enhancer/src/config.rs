//! Layered configuration loading.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from enhancer.toml)
//! - `~/.config/enhancer/enhancer.toml`
//! - `./enhancer.toml`

use config::{Config, File, FileFormat};
use enhancer_error::{ConfigError, EnhancerError, EnhancerResult};
use enhancer_openai::OpenAiSettings;
use enhancer_rate_limit::{BudgetsConfig, RateLimitConfig};
use enhancer_retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../enhancer.toml");

/// Everything the enhancer reads from `enhancer.toml`.
///
/// # Example
///
/// ```no_run
/// use enhancer::EnhancerConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EnhancerConfig::load()?;
/// println!("default budget: {}", config.default_budget);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnhancerConfig {
    /// Budget used when a caller does not name one
    #[serde(default = "default_budget_name")]
    pub default_budget: String,

    /// Named rate limit budgets; the presets when the table is absent
    #[serde(default = "default_budgets")]
    pub budgets: HashMap<String, RateLimitConfig>,

    /// Retry limits and backoff
    #[serde(default)]
    pub retry: RetryPolicy,

    /// OpenAI request settings
    #[serde(default)]
    pub openai: OpenAiSettings,
}

fn default_budget_name() -> String {
    BudgetsConfig::default().default_budget
}

fn default_budgets() -> HashMap<String, RateLimitConfig> {
    BudgetsConfig::default().budgets
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        let budgets = BudgetsConfig::default();
        Self {
            default_budget: budgets.default_budget,
            budgets: budgets.budgets,
            retry: RetryPolicy::default(),
            openai: OpenAiSettings::default(),
        }
    }
}

impl EnhancerConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> EnhancerResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                EnhancerError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                EnhancerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// The bundled defaults alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file does not parse, which indicates a packaging bug.
    pub fn bundled() -> EnhancerResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize::<Self>)
            .map_err(|e| {
                EnhancerError::from(ConfigError::new(format!(
                    "Failed to parse bundled configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled default.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the merged result is invalid.
    #[instrument]
    pub fn load() -> EnhancerResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/enhancer/enhancer.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("enhancer").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                EnhancerError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                EnhancerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        debug!(
            budgets = config.budgets.len(),
            default_budget = %config.default_budget,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Budget section as the rate limiter consumes it.
    pub fn budgets_config(&self) -> BudgetsConfig {
        BudgetsConfig {
            default_budget: self.default_budget.clone(),
            budgets: self.budgets.clone(),
        }
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid budget, retry limit, or OpenAI setting.
    pub fn validate(&self) -> EnhancerResult<()> {
        self.budgets_config().validate()?;
        self.retry.validate()?;
        self.openai.validate()?;
        Ok(())
    }
}
