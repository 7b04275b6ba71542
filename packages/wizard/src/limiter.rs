// ABOUTME: Advisory sliding-window rate limiter for AI-backed actions
// ABOUTME: Lets the action that fills the window through, then blocks for the cooldown

use std::time::{Duration, Instant};
use tracing::warn;

pub const MAX_ACTIONS: usize = 5;
pub const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window limiter over AI actions.
///
/// The action that brings the window to capacity is still allowed; it arms a
/// cooldown equal to the window length, and everything after that is refused
/// until the cooldown expires.
#[derive(Debug)]
pub struct RateLimiter {
    max_actions: usize,
    window: Duration,
    hits: Vec<Instant>,
    blocked_until: Option<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_ACTIONS, WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_actions: usize, window: Duration) -> Self {
        Self {
            max_actions,
            window,
            hits: Vec::new(),
            blocked_until: None,
        }
    }

    /// Record an action attempt; returns false if the caller must back off
    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Clock-injected variant of [`try_acquire`](Self::try_acquire)
    pub fn try_acquire_at(&mut self, now: Instant) -> bool {
        if let Some(until) = self.blocked_until {
            if now < until {
                warn!(
                    remaining_secs = (until - now).as_secs(),
                    "AI action refused, cooldown active"
                );
                return false;
            }
            self.blocked_until = None;
            self.hits.clear();
        }

        self.hits.retain(|hit| now.duration_since(*hit) < self.window);
        self.hits.push(now);
        if self.hits.len() >= self.max_actions {
            self.blocked_until = Some(now + self.window);
        }
        true
    }
}
