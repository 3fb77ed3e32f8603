/// Gates how often an action may fire (e.g. progress notifications).
///
/// Independent from cancellation: a limited action is skipped, not cancelled.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    /// Allow at most one action per `interval`
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Limiter that never blocks
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `action` if the interval elapsed since the last fired action.
    ///
    /// Returns true if the action ran. The first call always fires.
    pub fn call<F: FnOnce()>(&mut self, action: F) -> bool {
        self.call_at(Instant::now(), action)
    }

    fn call_at<F: FnOnce()>(&mut self, now: Instant, action: F) -> bool {
        if let Some(last) = self.last {
            if now.duration_since(last) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        action();
        true
    }
}
