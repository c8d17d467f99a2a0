//! Time abstraction for testability.
//!
//! This module provides a [`Sleeper`] trait so that backoff and rate-limit
//! delays can be skipped in tests, and [`sleep_or_cancel`] which lets an
//! external [`CancellationToken`] abort any of those waits.
//!
//! Timestamps taken by the rate limiter use [`tokio::time::Instant`], so a
//! paused Tokio clock (`#[tokio::test(start_paused = true)]`) acts as the
//! simulated clock in tests.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Abstraction over asynchronous delays.
///
/// # Example
///
/// ```
/// use whatsapp_cloud::time::{InstantSleeper, Sleeper};
/// use std::time::Duration;
///
/// # tokio_test_block_on(async {
/// InstantSleeper.sleep(Duration::from_secs(3600)).await; // returns at once
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub trait Sleeper: Send + Sync {
    /// Suspends the caller for (at least) `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that never waits.
///
/// Intended for tests that exercise retry paths without real delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Sleeps for `duration` unless `cancel` fires first.
///
/// The token is polled first, so an already-cancelled token always wins,
/// even against a sleeper that completes immediately.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if the token is cancelled before the
/// sleep completes.
pub async fn sleep_or_cancel<S: Sleeper>(
    sleeper: &S,
    duration: Duration,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        () = sleeper.sleep(duration) => Ok(()),
    }
}
