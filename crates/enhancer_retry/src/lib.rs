//! Request resilience: failure classification and the interactive retry loop.
//!
//! [`RetryCoordinator::run`] drives a fallible enhancement call through a bounded number of
//! attempts. Before each attempt it records a request against a shared
//! [`RateLimiter`](enhancer_rate_limit::RateLimiter); after each failure it classifies the error
//! with [`classify`] and asks an injected [`RecoveryUi`] what to do next.
//!
//! The coordinator never touches a terminal or editor itself. Hosts implement [`RecoveryUi`]
//! for their own surface and tests implement it with scripted answers.

mod classify;
mod coordinator;
mod policy;
mod recovery;

pub use classify::{ErrorClassification, FailureKind, classify};
pub use coordinator::{RetryCoordinator, RetrySession};
pub use policy::{Backoff, RetryPolicy};
pub use recovery::{RecoveryUi, RetryChoice, TerminalChoice};
