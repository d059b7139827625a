//! Retry policy with randomized exponential backoff.

use rand::Rng;
use std::time::Duration;

/// How many times a generation call is attempted and how long to wait between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Lower bound of every delay
    pub min_delay: Duration,
    /// Upper bound of every delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A policy that never waits; useful against local endpoints.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Upper bound of the delay after the given failed attempt (1-based):
    /// `min_delay * 2^(attempt-1)`, clamped to `[min_delay, max_delay]`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let min_ms = self.min_delay.as_millis();
        let max_ms = self.max_delay.as_millis().max(min_ms);
        let shift = attempt.saturating_sub(1).min(63);
        let multiplier = 1u128.checked_shl(shift).unwrap_or(u128::MAX);
        let exp_ms = min_ms.saturating_mul(multiplier).clamp(min_ms, max_ms);
        Duration::from_millis(exp_ms.min(u64::MAX as u128) as u64)
    }

    /// Randomized delay to sleep after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let low = self.min_delay.as_millis().min(u64::MAX as u128) as u64;
        let high = self.ceiling(attempt).as_millis().min(u64::MAX as u128) as u64;
        if high <= low {
            return Duration::from_millis(low);
        }
        Duration::from_millis(rand::thread_rng().gen_range(low..=high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_grows_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.ceiling(1), Duration::from_secs(1));
        assert_eq!(policy.ceiling(2), Duration::from_secs(2));
        assert_eq!(policy.ceiling(3), Duration::from_secs(4));
        assert_eq!(policy.ceiling(10), Duration::from_secs(60));
        assert_eq!(policy.ceiling(200), Duration::from_secs(60));
    }

    #[test]
    fn test_delay_stays_within_bounds() {
        let policy = RetryPolicy::default();
        for attempt in 1..=8 {
            let delay = policy.delay_for(attempt);
            assert!(delay >= policy.min_delay);
            assert!(delay <= policy.ceiling(attempt));
        }
    }

    #[test]
    fn test_immediate_never_waits() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
        assert_eq!(policy.delay_for(3), Duration::ZERO);
    }
}
