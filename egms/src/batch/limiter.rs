//! Request pacing.
//!
//! The archive service is rate-sensitive, so a tile request must not start
//! until a fixed interval has passed since the previous task finished. The
//! orchestrator calls [`RateLimiter::acquire`] immediately before every
//! request and [`RateLimiter::release`] once the task is done; `acquire`
//! blocks until the request is allowed to start.

use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default spacing between consecutive tile requests.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(1);

/// Gate that every tile request passes through before it starts.
///
/// Implementations take `&self` so one limiter can be shared by several
/// workers.
pub trait RateLimiter: Send + Sync {
    /// Blocks until the next request may start.
    fn acquire(&self);

    /// Marks the task started by the last `acquire` as finished.
    fn release(&self) {}
}

/// Enforces a minimum idle interval between consecutive tasks.
///
/// The interval runs from the last `release`, or from the last `acquire`
/// when the caller never releases. The first request passes immediately
/// and no delay is added after the last task of a batch.
#[derive(Debug)]
pub struct FixedIntervalLimiter {
    interval: Duration,
    idle_since: Mutex<Option<Instant>>,
}

impl FixedIntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            idle_since: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedIntervalLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_DELAY)
    }
}

impl RateLimiter for FixedIntervalLimiter {
    fn acquire(&self) {
        // Held across the sleep so concurrent callers queue up in turn
        let mut idle_since = self.idle_since.lock();

        if let Some(previous) = *idle_since {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }

        *idle_since = Some(Instant::now());
    }

    fn release(&self) {
        *self.idle_since.lock() = Some(Instant::now());
    }
}

/// Limiter that never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn acquire(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_acquire_does_not_wait() {
        let limiter = FixedIntervalLimiter::new(Duration::from_secs(5));

        let start = Instant::now();
        limiter.acquire();

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_consecutive_acquires_are_spaced() {
        let interval = Duration::from_millis(40);
        let limiter = FixedIntervalLimiter::new(interval);

        let mut starts = Vec::new();
        for _ in 0..4 {
            limiter.acquire();
            starts.push(Instant::now());
        }

        for pair in starts.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= interval);
        }
    }

    #[test]
    fn test_slow_task_still_waits_full_interval() {
        let interval = Duration::from_millis(30);
        let limiter = FixedIntervalLimiter::new(interval);

        limiter.acquire();
        thread::sleep(interval * 2);
        limiter.release();
        let finished = Instant::now();

        limiter.acquire();
        assert!(finished.elapsed() >= interval);
    }

    #[test]
    fn test_idle_time_counts_toward_interval() {
        let interval = Duration::from_millis(30);
        let limiter = FixedIntervalLimiter::new(interval);

        limiter.acquire();
        limiter.release();
        thread::sleep(interval * 2);

        let start = Instant::now();
        limiter.acquire();
        assert!(start.elapsed() < interval);
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(
            FixedIntervalLimiter::default().interval(),
            Duration::from_secs(1)
        );
    }
}
