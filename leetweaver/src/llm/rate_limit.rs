//! Sliding-window rate limiting for generation calls.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Allows at most `max_calls` acquisitions in any window of `period`.
///
/// Callers over the limit sleep until the oldest call leaves the window;
/// they never get an error.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            period,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Limit to `calls` per sixty seconds
    pub fn per_minute(calls: usize) -> Self {
        Self::new(calls, Duration::from_secs(60))
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Wait for a free slot and claim it
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut calls = self.calls.lock().await;
                let now = Instant::now();
                while calls
                    .front()
                    .is_some_and(|oldest| now.duration_since(*oldest) >= self.period)
                {
                    calls.pop_front();
                }

                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    return;
                }

                match calls.front() {
                    Some(oldest) => self.period.saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };

            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limit reached, waiting");
            tokio::time::sleep(wait).await;
        }
    }
}
