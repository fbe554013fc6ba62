//! Error types for the prompt enhancer.
//!
//! This crate provides the foundation error types used throughout the enhancer workspace,
//! plus the [`RawFailure`] boundary that failure classification works against.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use enhancer_error::{ConfigError, EnhancerResult};
//!
//! fn load_budget() -> EnhancerResult<u32> {
//!     Err(ConfigError::new("budget 'missing' is not configured"))?
//! }
//!
//! assert!(load_budget().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod failure;
mod input;
mod json;
mod openai;
mod rate_limit;
mod recovery;
mod settings;

pub use config::ConfigError;
pub use error::{EnhancerError, EnhancerErrorKind, EnhancerResult};
pub use failure::{AsRawFailure, RawFailure, codes};
pub use input::InputError;
pub use json::JsonError;
pub use openai::{OpenAiError, OpenAiErrorKind};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
pub use recovery::{RecoveryError, RecoveryErrorKind};
pub use settings::SettingsError;
