//! Sliding window limiter implementation

use super::types::{RateLimitResult, WindowState};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Sliding window limiter over requests and tokens per minute
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    rpm: u32,
    tpm: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl SlidingWindowLimiter {
    /// Create a limiter with a one minute window
    pub fn new(rpm: u32, tpm: u32) -> Self {
        Self::with_window(rpm, tpm, Duration::from_secs(60))
    }

    /// Create a limiter with custom window
    pub fn with_window(rpm: u32, tpm: u32, window: Duration) -> Self {
        Self {
            rpm,
            tpm,
            window,
            state: Mutex::new(WindowState::default()),
        }
    }

    /// Atomically check the budget and record the call if allowed
    pub fn check_and_record(&self) -> RateLimitResult {
        self.evaluate(Instant::now(), true)
    }

    /// Current budget without recording anything
    pub fn status(&self) -> RateLimitResult {
        self.evaluate(Instant::now(), false)
    }

    /// Account for tokens consumed by a completed call
    pub fn record_tokens(&self, tokens: u32) {
        if tokens == 0 {
            return;
        }
        self.state.lock().tokens.push_back((Instant::now(), tokens));
    }

    pub(super) fn evaluate(&self, now: Instant, record: bool) -> RateLimitResult {
        let mut state = self.state.lock();
        if let Some(window_start) = now.checked_sub(self.window) {
            state.prune(window_start);
        }

        let current_count = state.requests.len() as u32;
        let tokens_exhausted = self.tpm > 0 && state.token_total() >= self.tpm as u64;
        let allowed = current_count < self.rpm && !tokens_exhausted;
        let remaining = self.rpm.saturating_sub(current_count);

        // Time until the oldest tracked event expires
        let oldest = match (state.requests.front(), state.tokens.front()) {
            (Some(&r), Some(&(t, _))) if tokens_exhausted => Some(r.min(t)),
            (_, Some(&(t, _))) if tokens_exhausted => Some(t),
            (Some(&r), _) => Some(r),
            (None, _) => None,
        };
        let reset_after_secs = match oldest {
            Some(oldest) => {
                let elapsed = now.saturating_duration_since(oldest);
                let left = self.window.saturating_sub(elapsed);
                // Round up so callers never retry a moment too early
                left.as_secs() + u64::from(left.subsec_nanos() > 0)
            }
            None => self.window.as_secs(),
        };

        let retry_after_secs = if allowed {
            if record {
                state.requests.push_back(now);
            }
            None
        } else {
            debug!(
                "Rate limit exceeded: {}/{} requests in window",
                current_count, self.rpm
            );
            Some(reset_after_secs.max(1))
        };

        RateLimitResult {
            allowed,
            current_count,
            limit: self.rpm,
            remaining: if record && allowed {
                remaining.saturating_sub(1)
            } else {
                remaining
            },
            reset_after_secs,
            retry_after_secs,
        }
    }
}
