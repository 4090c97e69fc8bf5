//! Reconnect policy for the live channel.
//!
//! Bounded exponential backoff with optional jitter:
//!
//! | Attempt | Base delay (defaults) |
//! |---------|-----------------------|
//! | 1       | 500ms                 |
//! | 2       | 1s                    |
//! | 3       | 2s                    |
//! | ...     | capped at 30s         |
//!
//! After `max_attempts` consecutive failures the channel gives up and
//! reports itself disconnected. `max_attempts = 0` disables reconnects.

use rand::Rng;
use std::time::Duration;

/// How the channel manager reacts to a lost or failed connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Consecutive failed attempts before giving up.
    ///
    /// Default: 5
    pub max_attempts: u32,

    /// Delay before the first retry.
    ///
    /// Default: 500ms
    pub initial_backoff: Duration,

    /// Upper bound on any delay.
    ///
    /// Default: 30 seconds
    pub max_backoff: Duration,

    /// Growth factor between attempts.
    pub multiplier: f64,

    /// Spread delays by ±30% so many clients do not reconnect in lockstep.
    pub jitter: bool,

    /// A connection that stays open this long counts as healthy and
    /// resets the attempt counter when it drops.
    ///
    /// Default: 30 seconds
    pub stable_after: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
            stable_after: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Never reconnect: an unexpected close leaves the channel disconnected.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_stable_after(mut self, stable_after: Duration) -> Self {
        self.stable_after = stable_after;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 0
    }

    /// Delay before retry number `attempt` (1-based), or `None` once the
    /// budget is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_ms = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped_ms = base_ms.min(self.max_backoff.as_millis() as f64);

        let delay_ms = if self.jitter {
            let factor = 1.0 + rand::thread_rng().gen_range(-0.3..0.3);
            (capped_ms * factor).min(self.max_backoff.as_millis() as f64)
        } else {
            capped_ms
        };

        Some(Duration::from_millis(delay_ms.max(0.0) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> ReconnectPolicy {
        ReconnectPolicy::default()
            .with_jitter(false)
            .with_backoff(Duration::from_millis(100), Duration::from_millis(1_000))
            .with_max_attempts(6)
    }

    #[test]
    fn default_policy_values() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
        assert_eq!(policy.max_backoff, Duration::from_secs(30));
        assert!(policy.is_enabled());
    }

    #[test]
    fn delays_grow_exponentially_and_cap() {
        let policy = fixed();
        let delays: Vec<u64> = (1..=6)
            .map(|n| policy.delay_for(n).unwrap().as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn budget_is_bounded() {
        let policy = fixed();
        assert!(policy.delay_for(0).is_none());
        assert!(policy.delay_for(7).is_none());
    }

    #[test]
    fn disabled_policy_never_retries() {
        let policy = ReconnectPolicy::disabled();
        assert!(!policy.is_enabled());
        assert!(policy.delay_for(1).is_none());
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = fixed().with_jitter(true);
        for _ in 0..100 {
            let delay = policy.delay_for(2).unwrap().as_millis() as u64;
            assert!((139..=260).contains(&delay), "delay {delay} out of range");
        }
    }
}
