//! Sliding-window rate limiter.
//!
//! The limiter keeps the timestamp of every request still inside the window, oldest first.
//! Expired entries are dropped lazily at the start of every read or write, so there are no
//! background timers and a budget costs nothing while idle. Purging pops from the front only,
//! which makes each call O(expired) and amortized O(1) for steady traffic.
//!
//! Time comes from [`tokio::time::Instant`], so tests drive the window with a paused clock
//! (`tokio::time::advance`) instead of real sleeps.

use crate::{RateLimitConfig, RateLimitConfigUpdate};
use derive_getters::Getters;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Extra sleep added on top of the computed wait in [`RateLimiter::wait_for_availability`].
const AVAILABILITY_BUFFER: Duration = Duration::from_millis(100);

/// Result of trying to record a request against a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request was recorded.
    Allowed {
        /// Requests still available in the current window
        remaining: u32,
        /// Time until the oldest recorded request leaves the window
        reset_in: Duration,
    },
    /// The budget is spent; nothing was recorded.
    Limited {
        /// Time until a slot frees up
        wait_time: Duration,
        /// Same as `wait_time`
        reset_in: Duration,
    },
}

impl RequestOutcome {
    /// Whether the request was recorded.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RequestOutcome::Allowed { .. })
    }

    /// Wait time for a limited request.
    pub fn wait_time(&self) -> Option<Duration> {
        match self {
            RequestOutcome::Limited { wait_time, .. } => Some(*wait_time),
            RequestOutcome::Allowed { .. } => None,
        }
    }

    /// Remaining slots after an allowed request.
    pub fn remaining(&self) -> Option<u32> {
        match self {
            RequestOutcome::Allowed { remaining, .. } => Some(*remaining),
            RequestOutcome::Limited { .. } => None,
        }
    }

    /// Time until the oldest request in the window expires.
    pub fn reset_in(&self) -> Duration {
        match self {
            RequestOutcome::Allowed { reset_in, .. } | RequestOutcome::Limited { reset_in, .. } => {
                *reset_in
            }
        }
    }
}

/// Read-only snapshot of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct RateLimitStatus {
    /// Requests inside the current window
    used: u32,
    /// Requests still available
    remaining: u32,
    /// The configured ceiling
    limit: u32,
    /// Time until the oldest request expires, zero when the window is empty
    reset_in: Duration,
}

#[derive(Debug)]
struct Window {
    config: RateLimitConfig,
    requests: VecDeque<Instant>,
}

impl Window {
    fn purge(&mut self, now: Instant) {
        let window = self.config.window();
        while let Some(&oldest) = self.requests.front() {
            if now.saturating_duration_since(oldest) < window {
                break;
            }
            self.requests.pop_front();
        }
    }

    fn used(&self) -> u32 {
        u32::try_from(self.requests.len()).unwrap_or(u32::MAX)
    }

    fn has_capacity(&self) -> bool {
        self.used() < self.config.max_requests
    }

    fn oldest_expires_in(&self, now: Instant) -> Option<Duration> {
        self.requests
            .front()
            .map(|&oldest| (oldest + self.config.window()).saturating_duration_since(now))
    }

    fn wait_time(&self, now: Instant) -> Duration {
        // An empty window only blocks when max_requests is zero; report the full window.
        self.oldest_expires_in(now)
            .unwrap_or_else(|| self.config.window())
    }
}

/// Sliding-window limiter for one named budget.
///
/// All methods take `&self`; share one limiter between concurrent callers with an `Arc`.
/// Each call holds an internal lock only for its synchronous bookkeeping, never across an
/// await point, so recording a request is atomic with respect to other tasks.
///
/// # Example
///
/// ```
/// use enhancer_rate_limit::{RateLimitConfig, RateLimiter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let limiter = RateLimiter::new("openai-free", RateLimitConfig::new(20, 60_000));
/// let outcome = limiter.record_request();
/// assert_eq!(outcome.remaining(), Some(19));
/// assert_eq!(*limiter.status().used(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    name: String,
    window: Mutex<Window>,
}

impl RateLimiter {
    /// Create a limiter with an empty window.
    pub fn new(name: impl Into<String>, config: RateLimitConfig) -> Self {
        Self {
            name: name.into(),
            window: Mutex::new(Window {
                config,
                requests: VecDeque::new(),
            }),
        }
    }

    /// Budget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current limits.
    pub fn config(&self) -> RateLimitConfig {
        self.lock().config
    }

    /// Record a request if the budget allows it.
    ///
    /// Purges expired entries first. When the window is full nothing is recorded and the
    /// outcome carries the time until the oldest entry expires.
    #[instrument(skip(self), fields(budget = %self.name))]
    pub fn record_request(&self) -> RequestOutcome {
        let mut window = self.lock();
        let now = Instant::now();
        window.purge(now);

        if !window.has_capacity() {
            let wait_time = window.wait_time(now);
            debug!(
                wait_ms = wait_time.as_millis() as u64,
                used = window.used(),
                limit = window.config.max_requests,
                "Rate limit exceeded"
            );
            return RequestOutcome::Limited {
                wait_time,
                reset_in: wait_time,
            };
        }

        window.requests.push_back(now);
        let remaining = window.config.max_requests.saturating_sub(window.used());
        let reset_in = window
            .oldest_expires_in(now)
            .unwrap_or_else(|| window.config.window());
        debug!(
            remaining,
            limit = window.config.max_requests,
            "Request recorded"
        );
        RequestOutcome::Allowed {
            remaining,
            reset_in,
        }
    }

    /// Whether a request would be allowed right now. Only purges; records nothing.
    pub fn can_make_request(&self) -> bool {
        let mut window = self.lock();
        window.purge(Instant::now());
        window.has_capacity()
    }

    /// Snapshot of the budget after purging.
    pub fn status(&self) -> RateLimitStatus {
        let mut window = self.lock();
        let now = Instant::now();
        window.purge(now);
        let used = window.used();
        RateLimitStatus {
            used,
            remaining: window.config.max_requests.saturating_sub(used),
            limit: window.config.max_requests,
            reset_in: window.oldest_expires_in(now).unwrap_or(Duration::ZERO),
        }
    }

    /// Forget every recorded request.
    #[instrument(skip(self), fields(budget = %self.name))]
    pub fn reset(&self) {
        self.lock().requests.clear();
        debug!("Rate limiter reset");
    }

    /// Merge new limits.
    ///
    /// Recorded timestamps are kept and judged against the new window on the next access.
    #[instrument(skip(self), fields(budget = %self.name))]
    pub fn update_config(&self, update: RateLimitConfigUpdate) {
        let mut window = self.lock();
        window.config = window.config.merged(update);
        debug!(
            max_requests = window.config.max_requests,
            window_ms = window.config.window_ms,
            "Rate limit config updated"
        );
    }

    /// Suspend until the budget has room for another request.
    ///
    /// Sleeps for the computed wait plus a small buffer between checks rather than polling.
    /// Nothing is recorded; call [`RateLimiter::record_request`] afterwards. With
    /// `max_requests = 0` this never completes, so callers should drop the future.
    #[instrument(skip(self), fields(budget = %self.name))]
    pub async fn wait_for_availability(&self) {
        loop {
            let wait = {
                let mut window = self.lock();
                let now = Instant::now();
                window.purge(now);
                if window.has_capacity() {
                    return;
                }
                window.wait_time(now)
            };
            debug!(
                wait_secs = wait.as_millis().div_ceil(1000) as u64,
                "Waiting before next request"
            );
            tokio::time::sleep(wait + AVAILABILITY_BUFFER).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        // The window holds plain data; a panic elsewhere cannot leave it half-updated.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
