//! Exponential backoff policy for calls to external services.

use std::time::Duration;

/// Retry policy with exponential backoff.
///
/// `max_retries` counts retries after the first attempt, so a policy with
/// `max_retries = 2` makes at most three attempts in total.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Build a doubling policy from a retry count and initial delay in
    /// milliseconds, as they appear in configuration.
    #[must_use]
    pub fn doubling(max_retries: u32, initial_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_backoff_ms),
            ..Default::default()
        }
    }

    /// Delay to wait before retry number `retry` (0-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        // Large exponents overflow Duration, so cap while still in f64
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let delay_secs = (self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent))
            .min(self.max_delay.as_secs_f64());

        Duration::try_from_secs_f64(delay_secs).unwrap_or(self.max_delay)
    }

    /// Whether another attempt is allowed after `retries_done` retries.
    #[must_use]
    pub const fn should_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Total number of attempts the policy allows.
    #[must_use]
    pub const fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_doubles_from_200ms() {
        let config = RetryConfig::default();

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_retries: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
            multiplier: 2.0,
        };

        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(3));
    }

    #[test]
    fn test_large_retry_index_stays_at_cap() {
        let config = RetryConfig::doubling(100, 200);

        assert_eq!(config.delay_for_attempt(80), config.max_delay);
        assert_eq!(config.delay_for_attempt(u32::MAX), config.max_delay);
    }

    #[test]
    fn test_should_retry_and_total_attempts() {
        let config = RetryConfig::doubling(2, 10);

        assert_eq!(config.total_attempts(), 3);
        assert!(config.should_retry(0));
        assert!(config.should_retry(1));
        assert!(!config.should_retry(2));
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(10));
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let config = RetryConfig::doubling(0, 200);

        assert_eq!(config.total_attempts(), 1);
        assert!(!config.should_retry(0));
    }
}
