//! Request rate limiting for the SEC EDGAR APIs.

use roe_core::{Result, RoeError};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

/// Default maximum requests per window (SEC fair-access limit).
pub const DEFAULT_MAX_REQUESTS: usize = 10;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

/// Default minimum spacing between two granted requests.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Default delay before the first retry.
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(1000);

/// Default upper bound on a single backoff delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_millis(30_000);

/// Rate limiter configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum grants within any trailing window.
    pub max_requests: usize,
    /// Length of the sliding window.
    pub window: Duration,
    /// Minimum time between two grants.
    pub min_interval: Duration,
    /// Delay before retry attempt 0; doubles with every attempt.
    pub base_backoff: Duration,
    /// Upper bound on a single backoff delay.
    pub max_backoff: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
            min_interval: DEFAULT_MIN_INTERVAL,
            base_backoff: DEFAULT_BASE_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RateLimitConfig {
    /// Sets the maximum grants per window.
    #[must_use]
    pub const fn with_max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Sets the window length.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the minimum spacing between grants.
    #[must_use]
    pub const fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Sets the backoff base and cap.
    #[must_use]
    pub const fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff = base;
        self.max_backoff = max;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(RoeError::InvalidParameter(
                "max_requests must be at least 1".to_string(),
            ));
        }
        if self.window.is_zero() {
            return Err(RoeError::InvalidParameter(
                "window must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Grant history.
#[derive(Debug, Default)]
struct Window {
    granted: VecDeque<Instant>,
    last_granted: Option<Instant>,
}

impl Window {
    fn evict(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.granted.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.granted.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Sliding-window rate limiter shared by every request against one upstream budget.
///
/// Two limits hold at once: no more than `max_requests` grants in any trailing
/// `window`, and at least `min_interval` between consecutive grants. Waiters
/// queue on an async mutex, so grants are handed out one at a time in arrival
/// order.
///
/// Construct one instance per budget and share it behind an `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Mutex<Window>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self {
            config: RateLimitConfig::default(),
            window: Mutex::new(Window::default()),
        }
    }
}

impl RateLimiter {
    /// Create a rate limiter, rejecting a zero request budget or window.
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            window: Mutex::new(Window::default()),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Waits until one more request may be issued, then records it.
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;

        loop {
            let now = Instant::now();
            window.evict(now, self.config.window);

            if window.granted.len() >= self.config.max_requests {
                // Non-empty: max_requests is at least 1.
                let oldest = window.granted.front().copied().unwrap_or(now);
                let wait = self
                    .config
                    .window
                    .saturating_sub(now.saturating_duration_since(oldest))
                    + self.config.min_interval;
                debug!(
                    wait_ms = wait.as_millis() as u64,
                    in_window = window.granted.len(),
                    "Rate limit window full, waiting"
                );
                sleep(wait).await;
                continue;
            }

            if let Some(last) = window.last_granted {
                let since = now.saturating_duration_since(last);
                if since < self.config.min_interval {
                    sleep(self.config.min_interval - since).await;
                    continue;
                }
            }

            window.granted.push_back(now);
            window.last_granted = Some(now);
            trace!(in_window = window.granted.len(), "Request slot granted");
            return;
        }
    }

    /// Returns the number of grants inside the current window.
    pub async fn in_flight(&self) -> usize {
        let mut window = self.window.lock().await;
        window.evict(Instant::now(), self.config.window);
        window.granted.len()
    }

    /// Delay before retry `attempt`: `min(2^attempt × base_backoff, max_backoff)`.
    pub fn backoff_delay(&self, attempt: i32) -> Result<Duration> {
        let attempt = u32::try_from(attempt).map_err(|_| {
            RoeError::InvalidParameter(format!(
                "retry attempt must be non-negative, got {attempt}"
            ))
        })?;
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        Ok(self
            .config
            .base_backoff
            .saturating_mul(factor)
            .min(self.config.max_backoff))
    }

    /// Sleeps for [`RateLimiter::backoff_delay`] before a failed request is retried.
    pub async fn backoff(&self, attempt: i32) -> Result<()> {
        let delay = self.backoff_delay(attempt)?;
        debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off");
        sleep(delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_thirty_requests_respect_spacing() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for _ in 0..30 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_millis(2900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_window_blocks_until_oldest_expires() {
        let config = RateLimitConfig::default()
            .with_max_requests(5)
            .with_min_interval(Duration::ZERO);
        let limiter = RateLimiter::new(config).unwrap();
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(1000));
        assert_eq!(limiter.in_flight().await, 5);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_never_exceeds_budget() {
        let config = RateLimitConfig::default()
            .with_max_requests(3)
            .with_min_interval(Duration::from_millis(10));
        let limiter = RateLimiter::new(config).unwrap();

        for _ in 0..12 {
            limiter.acquire().await;
            assert!(limiter.in_flight().await <= 3);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_between_tasks() {
        let limiter = Arc::new(RateLimiter::default());
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    for _ in 0..5 {
                        limiter.acquire().await;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // 15 grants, 100 ms apart.
        assert!(start.elapsed() >= Duration::from_millis(1400));
    }

    #[test]
    fn test_backoff_delay_doubles_and_caps() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.backoff_delay(0).unwrap(), Duration::from_millis(1000));
        assert_eq!(limiter.backoff_delay(1).unwrap(), Duration::from_millis(2000));
        assert_eq!(limiter.backoff_delay(3).unwrap(), Duration::from_millis(8000));
        assert_eq!(limiter.backoff_delay(5).unwrap(), Duration::from_millis(30_000));
        assert_eq!(limiter.backoff_delay(40).unwrap(), Duration::from_millis(30_000));
    }

    #[test]
    fn test_backoff_rejects_negative_attempt() {
        let limiter = RateLimiter::default();
        assert!(matches!(
            limiter.backoff_delay(-1),
            Err(RoeError::InvalidParameter(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        limiter.backoff(2).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(4000));
    }

    #[test]
    fn test_invalid_config() {
        assert!(RateLimiter::new(RateLimitConfig::default().with_max_requests(0)).is_err());
        assert!(RateLimiter::new(RateLimitConfig::default().with_window(Duration::ZERO)).is_err());
    }
}
