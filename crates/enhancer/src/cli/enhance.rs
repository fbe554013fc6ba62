//! Prompt enhancement command handler.

use super::{EnhanceArgs, OutputFormat};
use enhancer::{
    EnhanceOutcome, EnhancementRequest, Enhancer, EnhancerConfig, EnhancerResult, InputError,
    JsonError, TerminalRecovery,
};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, instrument};

/// Enhance a prompt and print the result.
///
/// Returns `false` when the user gave up, so the caller can exit non-zero.
#[instrument(skip_all, fields(budget = ?args.budget))]
pub async fn run_enhance(config: &EnhancerConfig, args: EnhanceArgs) -> EnhancerResult<bool> {
    let text = read_prompt(&args).await?;
    let request = EnhancementRequest::new(&text, args.instructions.clone())?;

    let mut enhancer = Enhancer::from_config(config)?;
    if let Some(key) = args.api_key {
        enhancer = enhancer.with_api_key(key);
    }
    let recovery = TerminalRecovery::stdio(enhancer.client().clone());

    let outcome = enhancer
        .enhance(&request, args.budget.as_deref(), &recovery)
        .await?;
    info!(
        calls = *outcome.session.calls(),
        enhanced = outcome.result.is_some(),
        "Enhancement finished"
    );

    print_outcome(&outcome, args.format)?;
    Ok(outcome.result.is_some())
}

async fn read_prompt(args: &EnhanceArgs) -> EnhancerResult<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        debug!(path = %path.display(), "Reading prompt from file");
        return tokio::fs::read_to_string(path).await.map_err(|e| {
            InputError::new(format!("Failed to read {}: {}", path.display(), e)).into()
        });
    }

    debug!("Reading prompt from stdin");
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|e| InputError::new(format!("Failed to read stdin: {}", e)))?;
    Ok(text)
}

fn print_outcome(outcome: &EnhanceOutcome, format: OutputFormat) -> EnhancerResult<()> {
    match format {
        OutputFormat::Human => match &outcome.result {
            Some(result) => {
                println!("{}", result.enhanced_text());
                eprintln!(
                    "\n({} tokens, {}, {:.1}s)",
                    result.tokens_used(),
                    result.model(),
                    result.processing_time().as_secs_f64()
                );
            }
            None => eprintln!("Enhancement cancelled."),
        },
        OutputFormat::Json => {
            let value = json!({
                "budget": outcome.budget,
                "attempts": outcome.session.calls(),
                "credential_resets": outcome.session.credential_resets(),
                "result": outcome.result.as_ref().map(|result| json!({
                    "enhanced_text": result.enhanced_text(),
                    "tokens_used": result.tokens_used(),
                    "model": result.model(),
                    "processing_time_ms": result.processing_time().as_millis() as u64,
                })),
            });
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| JsonError::new(format!("Failed to serialize outcome: {}", e)))?;
            println!("{}", text);
        }
    }
    Ok(())
}
