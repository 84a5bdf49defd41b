//! Rolling-window limiter for weather provider calls.

use std::{
    collections::VecDeque,
    sync::{Arc, OnceLock},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::warn;

use crate::error::RateLimitExceeded;

pub const DEFAULT_MAX_CALLS: usize = 50;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);

static PROCESS_LIMITER: OnceLock<Arc<RateLimiter>> = OnceLock::new();

/// Allows at most `max_calls` calls in any trailing `window`.
///
/// State lives for as long as the limiter does. [`RateLimiter::process_wide`]
/// hands out the one instance every client in the process draws from.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// The limiter shared by the whole process.
    ///
    /// The first caller decides the quota; later callers get the same
    /// instance regardless of the quota they ask for.
    pub fn process_wide(max_calls: usize, window: Duration) -> Arc<RateLimiter> {
        let limiter =
            PROCESS_LIMITER.get_or_init(|| Arc::new(RateLimiter::new(max_calls, window)));

        if limiter.max_calls != max_calls || limiter.window != window {
            warn!(
                requested_max_calls = max_calls,
                requested_window_secs = window.as_secs(),
                max_calls = limiter.max_calls,
                window_secs = limiter.window.as_secs(),
                "Process rate limit already initialised with a different quota"
            );
        }

        Arc::clone(limiter)
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a call now, or fail if the window is already full.
    pub fn check_and_record(&self) -> Result<(), RateLimitExceeded> {
        self.check_and_record_at(Instant::now())
    }

    /// Same as [`Self::check_and_record`] with an explicit clock reading.
    pub fn check_and_record_at(&self, now: Instant) -> Result<(), RateLimitExceeded> {
        let mut calls = self.calls.lock();
        self.prune(&mut calls, now);

        if calls.len() >= self.max_calls {
            warn!(
                max_calls = self.max_calls,
                window_secs = self.window.as_secs(),
                "Weather request rejected by local rate limit"
            );
            return Err(RateLimitExceeded {
                max_calls: self.max_calls,
                window: self.window,
            });
        }

        calls.push_back(now);
        Ok(())
    }

    /// Calls still available in the current window.
    pub fn remaining(&self) -> usize {
        self.remaining_at(Instant::now())
    }

    pub fn remaining_at(&self, now: Instant) -> usize {
        let mut calls = self.calls.lock();
        self.prune(&mut calls, now);
        self.max_calls.saturating_sub(calls.len())
    }

    fn prune(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = calls.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            calls.pop_front();
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALLS, DEFAULT_WINDOW)
    }
}
