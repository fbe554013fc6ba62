//! Prompt Enhancer - rate-limited, interactively retried OpenAI prompt enhancement
//!
//! Enhancement requests pass through three layers:
//!
//! - **Rate limiting**: a sliding-window budget per named limiter, shared by every caller
//! - **Classification**: failures are mapped onto a small taxonomy with retry advice
//! - **Recovery**: a host-supplied [`RecoveryUi`] decides between retrying, changing settings,
//!   entering a new API key, or giving up
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use enhancer::{EnhancementRequest, Enhancer, EnhancerConfig, TerminalRecovery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EnhancerConfig::load()?;
//!     let enhancer = Enhancer::from_config(&config)?
//!         .with_api_key(std::env::var("OPENAI_API_KEY")?);
//!     let recovery = TerminalRecovery::stdio(enhancer.client().clone());
//!
//!     let request = EnhancementRequest::new("write a haiku about rust", None)?;
//!     let outcome = enhancer.enhance(&request, None, &recovery).await?;
//!     if let Some(result) = outcome.result {
//!         println!("{}", result.enhanced_text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `enhancer_error` - Error types and the raw failure boundary
//! - `enhancer_rate_limit` - Sliding-window limiter and budget registry
//! - `enhancer_retry` - Classifier, recovery trait, and retry coordinator
//! - `enhancer_openai` - OpenAI chat-completions transport
//!
//! This crate re-exports everything for convenience and adds configuration loading and a
//! terminal recovery surface.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod service;
mod terminal;

pub use config::EnhancerConfig;
pub use service::{EnhanceOutcome, Enhancer};
pub use terminal::{TerminalRecovery, parse_retry_choice, parse_terminal_choice};

pub use enhancer_error::*;
pub use enhancer_openai::*;
pub use enhancer_rate_limit::*;
pub use enhancer_retry::*;
