//! Fixed-window limiter for AI requests

use tokio::time::{Duration, Instant};
use tracing::info;

/// Allows `max_requests` per window; the window opens at the first request
/// and a full window makes the caller sleep until it elapses.
#[derive(Debug)]
pub struct WindowRateLimiter {
    max_requests: u32,
    window: Duration,
    window_start: Option<Instant>,
    count: u32,
}

impl WindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            window_start: None,
            count: 0,
        }
    }

    /// Reserve one request, sleeping first if the window is used up.
    /// Returns how long the caller was held back.
    pub async fn acquire(&mut self) -> Duration {
        let now = Instant::now();
        let mut waited = Duration::ZERO;

        match self.window_start {
            None => {
                self.window_start = Some(now);
                self.count = 0;
            }
            Some(start) => {
                let elapsed = now.duration_since(start);
                if elapsed >= self.window {
                    self.window_start = Some(now);
                    self.count = 0;
                } else if self.count >= self.max_requests {
                    waited = self.window - elapsed;
                    info!("Rate limit: waiting {:.1}s...", waited.as_secs_f64());
                    tokio::time::sleep(waited).await;
                    self.window_start = Some(Instant::now());
                    self.count = 0;
                }
            }
        }

        self.count += 1;
        waited
    }

    /// Requests made in the current window
    pub fn used(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requests_under_limit_do_not_wait() {
        let mut limiter = WindowRateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
        assert_eq!(limiter.used(), 3);
    }

    #[tokio::test]
    async fn test_full_window_waits_until_reset() {
        let window = Duration::from_millis(80);
        let mut limiter = WindowRateLimiter::new(2, window);

        let started = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        let waited = limiter.acquire().await;

        assert!(waited > Duration::ZERO);
        assert!(started.elapsed() >= Duration::from_millis(70));
        assert_eq!(limiter.used(), 1);
    }

    #[tokio::test]
    async fn test_elapsed_window_resets_without_waiting() {
        let mut limiter = WindowRateLimiter::new(1, Duration::from_millis(20));
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert_eq!(limiter.used(), 1);
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let limiter = WindowRateLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.max_requests, 1);
    }
}
