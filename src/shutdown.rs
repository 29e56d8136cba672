//! Cooperative stop flag shared between the worker and whoever controls it.
//!
//! Notes:
//! - Relaxed atomics are sufficient for a one-way "stop" flag.
//! - `request()` is safe to call from signal handlers.
//! - Nothing is interrupted: the worker checks the flag between bundles and
//!   while sleeping between passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Granularity of interruptible sleeps.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop (idempotent).
    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sleep for `total`, waking early once a stop is requested.
    /// Returns true if the full interval elapsed without a stop.
    pub fn sleep(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.is_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = StopFlag::new();
        let b = a.clone();
        assert!(!b.is_requested());
        a.request();
        assert!(b.is_requested());
    }

    #[test]
    fn sleep_returns_early_after_stop() {
        let flag = StopFlag::new();
        let remote = flag.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.request();
        });
        let started = Instant::now();
        assert!(!flag.sleep(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn sleep_completes_without_stop() {
        let flag = StopFlag::new();
        assert!(flag.sleep(Duration::from_millis(10)));
    }
}
