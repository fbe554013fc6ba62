//! CLI command definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Prompt Enhancer - improve prompts with OpenAI, with rate limiting and guided recovery
#[derive(Parser, Debug)]
#[command(name = "prompt-enhancer")]
#[command(about = "Improve prompts with OpenAI, with rate limiting and guided recovery", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enhance a prompt and print the result to stdout
    Enhance(EnhanceArgs),

    /// Show the state of every rate limit budget
    Budgets {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Classify a failure message the way the retry loop would
    Classify {
        /// Failure message
        message: String,

        /// Failure code, e.g. ETIMEDOUT
        #[arg(long)]
        code: Option<String>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },
}

/// Arguments for `enhance`
#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Prompt text; read from --file or stdin when omitted
    pub text: Option<String>,

    /// Read the prompt from a file
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Rate limit budget to draw from
    #[arg(long)]
    pub budget: Option<String>,

    /// Guidance placed ahead of the prompt
    #[arg(long)]
    pub instructions: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}
