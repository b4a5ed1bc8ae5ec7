//! Bounded exponential backoff

use std::time::Duration;

/// How many times to try and how long to wait between tries.
///
/// Attempt `n` (0-indexed) that fails is followed by a sleep of
/// `base_delay * 2^n`, except after the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Policy that never sleeps (tests, local backends)
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base backoff
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay after the given failed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another attempt follows `attempt`
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::timeouts::retry::MAX_ATTEMPTS,
            Duration::from_secs(crate::config::timeouts::retry::BASE_DELAY_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::new(4, Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(20));
    }

    #[test]
    fn test_has_next() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert!(policy.has_next(0));
        assert!(policy.has_next(1));
        assert!(!policy.has_next(2));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.has_next(0));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(64), Duration::from_secs(1).saturating_mul(u32::MAX));
    }

    #[test]
    fn test_default_matches_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.base_delay(), Duration::from_secs(5));
    }
}
