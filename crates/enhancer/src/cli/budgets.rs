//! Budget status command handler.

use super::OutputFormat;
use enhancer::{EnhancerConfig, EnhancerResult, JsonError, RateLimiterRegistry};
use serde_json::json;

/// Print every configured budget.
///
/// A fresh process has an empty window, so this shows capacity rather than live usage.
pub fn show_budgets(config: &EnhancerConfig, format: OutputFormat) -> EnhancerResult<()> {
    let registry = RateLimiterRegistry::from_budgets(&config.budgets_config())?;
    let mut statuses = registry.statuses();
    statuses.sort_by(|a, b| a.0.cmp(&b.0));

    match format {
        OutputFormat::Human => {
            println!("{:<24} {:>6} {:>10} {:>10}", "BUDGET", "LIMIT", "REMAINING", "WINDOW");
            for (name, status) in &statuses {
                let window = config
                    .budgets
                    .get(name)
                    .map(|c| c.window_ms)
                    .unwrap_or_default();
                let marker = if *name == config.default_budget { "*" } else { " " };
                println!(
                    "{}{:<23} {:>6} {:>10} {:>9}s",
                    marker,
                    name,
                    status.limit(),
                    status.remaining(),
                    window / 1_000
                );
            }
        }
        OutputFormat::Json => {
            let budgets: Vec<_> = statuses
                .iter()
                .map(|(name, status)| {
                    json!({
                        "name": name,
                        "default": *name == config.default_budget,
                        "limit": status.limit(),
                        "used": status.used(),
                        "remaining": status.remaining(),
                        "reset_in_ms": status.reset_in().as_millis() as u64,
                    })
                })
                .collect();
            let text = serde_json::to_string_pretty(&budgets)
                .map_err(|e| JsonError::new(format!("Failed to serialize budgets: {}", e)))?;
            println!("{}", text);
        }
    }
    Ok(())
}
