//! Prompt Enhancer CLI binary.
//!
//! - Enhance a prompt from an argument, a file, or stdin
//! - Show configured rate limit budgets
//! - Classify a failure message the way the retry loop does

use clap::Parser;
use enhancer::EnhancerConfig;
use std::process::ExitCode;

mod cli;
mod telemetry;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, classify_message, run_enhance, show_budgets};

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init_console_telemetry(cli.verbose);

    let config = match &cli.config {
        Some(path) => EnhancerConfig::from_file(path)?,
        None => EnhancerConfig::load()?,
    };

    match cli.command {
        Commands::Enhance(args) => {
            if !run_enhance(&config, args).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Budgets { format } => show_budgets(&config, format)?,
        Commands::Classify {
            message,
            code,
            format,
        } => classify_message(&message, code.as_deref(), format)?,
    }

    Ok(ExitCode::SUCCESS)
}
