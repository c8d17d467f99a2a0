//! Tests for `RetryPolicy`.

use super::RetryPolicy;
use std::time::Duration;

mod retry_policy_defaults {
    use super::*;

    #[test]
    fn new_creates_policy_with_defaults() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert!((policy.multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn default_trait_matches_new() {
        assert_eq!(RetryPolicy::new(), RetryPolicy::default());
    }
}

mod retry_policy_builder {
    use super::*;

    #[test]
    fn with_max_attempts_accepts_zero() {
        let policy = RetryPolicy::new().with_max_attempts(0);

        assert_eq!(policy.max_attempts, 0);
        assert!(!policy.should_retry(0));
    }

    #[test]
    fn with_initial_delay_sets_value() {
        let policy = RetryPolicy::new().with_initial_delay(Duration::from_millis(250));

        assert_eq!(policy.initial_delay, Duration::from_millis(250));
    }

    #[test]
    #[should_panic(expected = "multiplier must be positive")]
    fn with_multiplier_zero_panics() {
        let _ = RetryPolicy::new().with_multiplier(0.0);
    }
}

mod delay_for_retry {
    use super::*;

    #[test]
    fn default_backoff_doubles_from_one_second() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.delay_for_retry(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_retry(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_retry(9), Duration::from_secs(512));
    }

    #[test]
    fn custom_multiplier_is_applied() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_multiplier(3.0);

        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(900));
    }
}

mod should_retry {
    use super::*;

    #[test]
    fn no_retry_after_final_attempt() {
        let policy = RetryPolicy::new().with_max_attempts(3);

        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[test]
    fn single_attempt_never_retries() {
        let policy = RetryPolicy::new().with_max_attempts(1);

        assert!(!policy.should_retry(0));
    }
}
