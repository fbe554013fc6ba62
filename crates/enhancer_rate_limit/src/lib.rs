//! Client-side rate limiting for outbound LLM calls.
//!
//! Each named budget is an independent sliding window: at most `max_requests` calls in any
//! rolling `window_ms` span, evaluated against the actual request timestamps rather than
//! fixed buckets. Budgets are built once at startup into a [`RateLimiterRegistry`] and handed
//! to callers as shared [`RateLimiter`] handles.
//!
//! ```
//! use enhancer_rate_limit::{RateLimitConfig, RateLimiter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let limiter = RateLimiter::new("test", RateLimitConfig::new(3, 60_000));
//! for _ in 0..3 {
//!     assert!(limiter.record_request().is_allowed());
//! }
//! assert!(!limiter.record_request().is_allowed());
//! # }
//! ```

mod config;
mod limiter;
mod registry;

pub use config::{BudgetsConfig, RateLimitConfig, RateLimitConfigUpdate, presets};
pub use limiter::{RateLimitStatus, RateLimiter, RequestOutcome};
pub use registry::RateLimiterRegistry;
