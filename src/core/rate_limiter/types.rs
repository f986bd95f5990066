//! Rate limiter types and data structures

use std::collections::VecDeque;
use std::time::Instant;

/// Rate limit result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Current request count in the window
    pub current_count: u32,
    /// Maximum requests allowed
    pub limit: u32,
    /// Remaining requests in the window
    pub remaining: u32,
    /// Time until the oldest request leaves the window (in seconds)
    pub reset_after_secs: u64,
    /// Retry after (in seconds, only set when not allowed)
    pub retry_after_secs: Option<u64>,
}

/// Calls and token usage inside the current window
#[derive(Debug, Default)]
pub(super) struct WindowState {
    pub(super) requests: VecDeque<Instant>,
    pub(super) tokens: VecDeque<(Instant, u32)>,
}

impl WindowState {
    /// Drop everything that happened before `window_start`
    pub(super) fn prune(&mut self, window_start: Instant) {
        while self.requests.front().is_some_and(|&t| t <= window_start) {
            self.requests.pop_front();
        }
        while self.tokens.front().is_some_and(|&(t, _)| t <= window_start) {
            self.tokens.pop_front();
        }
    }

    pub(super) fn token_total(&self) -> u64 {
        self.tokens.iter().map(|&(_, n)| n as u64).sum()
    }
}
