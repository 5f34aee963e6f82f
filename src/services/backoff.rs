//! Reconnect policy: how long to wait before the next connection attempt.

use std::time::Duration;

use crate::config::BackoffConfig;

/// Decides the delay before reconnect attempt `attempt` (1-based).
/// Returning `None` stops the session.
pub trait ReconnectPolicy: Send {
    fn next_delay(&mut self, attempt: u32) -> Option<Duration>;

    /// Called once a connection reached the listening state.
    fn reset(&mut self) {}
}

/// Bounded exponential backoff with full jitter.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    max: Duration,
    max_attempts: Option<u32>,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            base,
            max: max.max(base),
            max_attempts,
        }
    }

    /// Upper bound for attempt `attempt` before jitter.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        self.base
            .checked_mul(1u32 << shift)
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl From<BackoffConfig> for ExponentialBackoff {
    fn from(config: BackoffConfig) -> Self {
        Self::new(config.base, config.max, config.max_attempts)
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn next_delay(&mut self, attempt: u32) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        let ceiling = self.ceiling(attempt).as_millis() as u64;
        Some(Duration::from_millis(fastrand::u64(0..=ceiling)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_doubles_and_caps() {
        let b = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_millis(1000), None);
        assert_eq!(b.ceiling(1), Duration::from_millis(100));
        assert_eq!(b.ceiling(2), Duration::from_millis(200));
        assert_eq!(b.ceiling(4), Duration::from_millis(800));
        assert_eq!(b.ceiling(5), Duration::from_millis(1000));
        assert_eq!(b.ceiling(500), Duration::from_millis(1000));
    }

    #[test]
    fn jittered_delay_within_ceiling() {
        let mut b = ExponentialBackoff::new(Duration::from_millis(50), Duration::from_millis(400), None);
        for attempt in 1..10 {
            let delay = b.next_delay(attempt).unwrap();
            assert!(delay <= b.ceiling(attempt));
        }
    }

    #[test]
    fn gives_up_after_budget() {
        let mut b = ExponentialBackoff::new(Duration::ZERO, Duration::ZERO, Some(2));
        assert!(b.next_delay(1).is_some());
        assert!(b.next_delay(2).is_some());
        assert!(b.next_delay(3).is_none());
    }
}
