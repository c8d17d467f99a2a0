//! Outbound call throttling.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::time::{TokioSleeper, sleep_or_cancel};

const WINDOW: Duration = Duration::from_secs(1);

/// Grants at most `N` permits within any rolling one-second window.
///
/// A permit is granted when fewer than `N` grants happened during the last
/// second. Each granted caller is then held for `1/N` seconds before
/// returning, which spreads a simultaneous burst of `N` callers over the
/// window instead of releasing them all at once.
///
/// Time is read from [`tokio::time::Instant`], so tests running on a paused
/// Tokio clock observe simulated time.
///
/// The limiter is `Sync`; share it between tasks behind an `Arc` or a
/// reference. The window lock is never held across an await point.
#[derive(Debug)]
pub struct RateLimiter {
    calls_per_second: u32,
    window: Mutex<Window>,
}

/// Grant instants within the last second, oldest first.
#[derive(Debug, Default)]
struct Window {
    grants: VecDeque<Instant>,
}

impl Window {
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.grants.front() {
            if now.duration_since(oldest) >= WINDOW {
                self.grants.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records a grant at `now`, or returns how long until one frees up.
    fn try_grant(&mut self, now: Instant, limit: usize) -> Result<(), Duration> {
        self.prune(now);

        if self.grants.len() < limit {
            self.grants.push_back(now);
            return Ok(());
        }

        let wait = self
            .grants
            .front()
            .map_or(WINDOW, |&oldest| WINDOW.saturating_sub(now.duration_since(oldest)));
        Err(wait)
    }
}

impl RateLimiter {
    /// Creates a limiter allowing `calls_per_second` grants per rolling second.
    ///
    /// # Panics
    ///
    /// Panics if `calls_per_second` is zero. [`Transport`](super::Transport)
    /// validates its settings before building a limiter.
    #[must_use]
    pub fn new(calls_per_second: u32) -> Self {
        assert!(calls_per_second > 0, "calls_per_second must be positive");
        Self {
            calls_per_second,
            window: Mutex::new(Window::default()),
        }
    }

    /// Returns the configured ceiling.
    #[must_use]
    pub const fn calls_per_second(&self) -> u32 {
        self.calls_per_second
    }

    /// Returns how many permits could be granted right now.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.prune(Instant::now());
        self.limit().saturating_sub(window.grants.len())
    }

    /// Waits for a permit. Never fails.
    pub async fn acquire(&self) {
        // Only cancellation can fail the wait, and no token is supplied.
        let _ = self.acquire_inner(None).await;
    }

    /// Waits for a permit unless `cancel` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the token is cancelled while waiting
    /// for a permit or during the smoothing delay.
    pub async fn acquire_or_cancel(&self, cancel: &CancellationToken) -> Result<(), Error> {
        self.acquire_inner(Some(cancel)).await
    }

    async fn acquire_inner(&self, cancel: Option<&CancellationToken>) -> Result<(), Error> {
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(Error::Cancelled);
            }

            let outcome = {
                let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
                window.try_grant(Instant::now(), self.limit())
            };

            match outcome {
                Ok(()) => break,
                Err(wait) => {
                    tracing::trace!(wait = ?wait, "Rate limit window full");
                    pause(wait, cancel).await?;
                }
            }
        }

        pause(self.smoothing_delay(), cancel).await
    }

    fn smoothing_delay(&self) -> Duration {
        WINDOW / self.calls_per_second
    }

    fn limit(&self) -> usize {
        usize::try_from(self.calls_per_second).unwrap_or(usize::MAX)
    }
}

async fn pause(duration: Duration, cancel: Option<&CancellationToken>) -> Result<(), Error> {
    match cancel {
        Some(token) => sleep_or_cancel(&TokioSleeper, duration, token).await,
        None => {
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    async fn completion_times(limiter: Arc<RateLimiter>, callers: usize) -> Vec<Instant> {
        let handles: Vec<_> = (0..callers)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut times = Vec::with_capacity(callers);
        for handle in handles {
            times.push(handle.await.unwrap());
        }
        times.sort();
        times
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_limit_in_any_rolling_second() {
        let limiter = Arc::new(RateLimiter::new(5));

        let times = completion_times(limiter, 12).await;

        assert_eq!(times.len(), 12);
        for &start in &times {
            let in_window = times
                .iter()
                .filter(|&&t| t >= start && t < start + WINDOW)
                .count();
            assert!(in_window <= 5, "{in_window} completions within one second");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn callers_within_limit_only_pay_smoothing_delay() {
        let limiter = Arc::new(RateLimiter::new(4));
        let start = Instant::now();

        let times = completion_times(limiter, 4).await;

        let latest = times.last().copied().unwrap();
        assert_eq!(latest - start, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn overflow_caller_waits_for_window_to_roll() {
        let limiter = RateLimiter::new(2);
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Two grants at 0ms and 500ms; the third opens at 1000ms and then
        // pays the 500ms smoothing delay.
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn available_permits_replenish_after_one_second() {
        let limiter = RateLimiter::new(3);
        limiter.acquire().await;
        limiter.acquire().await;

        assert_eq!(limiter.available_permits(), 1);

        tokio::time::advance(WINDOW).await;
        assert_eq!(limiter.available_permits(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_does_not_consume_permit() {
        let limiter = RateLimiter::new(1);
        let token = CancellationToken::new();
        token.cancel();

        let result = limiter.acquire_or_cancel(&token).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(limiter.available_permits(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_pending_acquire() {
        let limiter = Arc::new(RateLimiter::new(1));
        limiter.acquire().await;

        let token = CancellationToken::new();
        let waiter = {
            let limiter = Arc::clone(&limiter);
            let token = token.clone();
            tokio::spawn(async move { limiter.acquire_or_cancel(&token).await })
        };

        tokio::task::yield_now().await;
        token.cancel();

        assert!(matches!(waiter.await.unwrap(), Err(Error::Cancelled)));
    }

    #[test]
    #[should_panic(expected = "calls_per_second must be positive")]
    fn zero_rate_panics() {
        let _ = RateLimiter::new(0);
    }

    #[test]
    fn window_reports_time_until_oldest_grant_expires() {
        let now = Instant::now();
        let mut window = Window::default();

        assert!(window.try_grant(now, 1).is_ok());
        let wait = window
            .try_grant(now + Duration::from_millis(300), 1)
            .unwrap_err();

        assert_eq!(wait, Duration::from_millis(700));
    }
}
