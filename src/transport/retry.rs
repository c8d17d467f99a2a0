//! Retry policy for transient transport failures.

use std::time::Duration;

/// Exponential backoff configuration.
///
/// Controls how many attempts one logical request may make and how long
/// to wait between them. Only transient failures (server errors and
/// network-level failures) are retried; the transport decides which
/// failures qualify.
///
/// # Defaults
///
/// - `max_attempts`: 3
/// - `initial_delay`: 1 second
/// - `multiplier`: 2.0 (delays of 1s, 2s, 4s, ...)
///
/// # Example
///
/// ```
/// use whatsapp_cloud::transport::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new().with_max_attempts(5);
/// assert_eq!(policy.delay_for_retry(2), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    ///
    /// Zero is accepted and means no attempt is made at all; the
    /// transport then reports a generic network error.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Default maximum attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Default initial delay (1 second).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

    /// Default multiplier (2.0).
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Creates a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }

    /// Sets the total number of attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the delay multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Computes the delay to wait after the given 0-based attempt failed.
    ///
    /// Attempt 0 waits `initial_delay`, attempt 1 waits
    /// `initial_delay * multiplier`, and so on.
    #[must_use]
    pub fn delay_for_retry(&self, attempt: u32) -> Duration {
        // Attempts are bounded by configuration (<= 10), far below i32::MAX
        #[allow(clippy::cast_possible_wrap)]
        let factor = self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(self.initial_delay.as_secs_f64() * factor)
    }

    /// Returns true if another attempt follows the given 0-based attempt.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
