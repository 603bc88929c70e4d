//! Bounded exponential backoff for agent calls.

use std::time::Duration;

use crate::error::TransportError;

/// Default attempts per agent call (first try plus two retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);
/// Default upper bound on any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Decides whether a transport error is worth another attempt.
pub type RetryPredicate = fn(&TransportError) -> bool;

/// Retry policy applied at the invoker boundary.
///
/// Delay before retry `n` (0-based) is `base_delay * 2^n`, capped at
/// `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Which errors are retried.
    pub retryable: RetryPredicate,
}

impl RetryPolicy {
    /// Creates a policy retrying [`TransportError::is_retryable`] errors.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: DEFAULT_MAX_DELAY,
            retryable: TransportError::is_retryable,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Sets the delay cap.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Replaces the retry predicate.
    #[must_use]
    pub const fn with_predicate(mut self, retryable: RetryPredicate) -> Self {
        self.retryable = retryable;
        self
    }

    /// Delay before retry number `retry` (0 = first retry).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Whether to try again after `attempt` (1-based) failed with `err`.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, err: &TransportError) -> bool {
        attempt < self.max_attempts && (self.retryable)(err)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}
