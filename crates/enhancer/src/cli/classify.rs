//! Failure classification command handler.

use super::OutputFormat;
use enhancer::{EnhancerResult, JsonError, RawFailure, classify};
use serde_json::json;

/// Classify a failure message and print the verdict.
pub fn classify_message(
    message: &str,
    code: Option<&str>,
    format: OutputFormat,
) -> EnhancerResult<()> {
    let mut failure = RawFailure::new(message);
    if let Some(code) = code {
        failure = failure.with_code(code);
    }
    let classification = classify(&failure);

    match format {
        OutputFormat::Human => {
            println!("Kind:       {}", classification.kind());
            println!("Retryable:  {}", classification.retryable());
            println!("Suggestion: {}", classification.suggestion());
        }
        OutputFormat::Json => {
            let value = json!({
                "kind": classification.kind().to_string(),
                "retryable": classification.retryable(),
                "suggestion": classification.suggestion(),
                "message": classification.message(),
            });
            let text = serde_json::to_string_pretty(&value).map_err(|e| {
                JsonError::new(format!("Failed to serialize classification: {}", e))
            })?;
            println!("{}", text);
        }
    }
    Ok(())
}
