//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the prompt-enhancer binary.

mod budgets;
mod classify;
mod commands;
mod enhance;

pub use budgets::show_budgets;
pub use classify::classify_message;
pub use commands::{Cli, Commands, EnhanceArgs, OutputFormat};
pub use enhance::run_enhance;
