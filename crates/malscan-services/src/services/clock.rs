//! Time source for the analysis poll loop.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Supplies "now" and waits. Production uses [`TokioClock`]; tests can swap in
/// a clock whose sleeps return immediately.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);

    /// Resolve once `now()` reaches `deadline`.
    async fn sleep_until(&self, deadline: Instant);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-util"))]
mod manual {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Virtual clock: `sleep` advances time instantly, `sleep_until` waits
    /// for someone else to advance it.
    #[derive(Debug)]
    pub struct ManualClock {
        origin: Instant,
        elapsed: Mutex<Duration>,
        sleeps: AtomicUsize,
        advanced: Notify,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                elapsed: Mutex::new(Duration::ZERO),
                sleeps: AtomicUsize::new(0),
                advanced: Notify::new(),
            }
        }

        pub fn advance(&self, by: Duration) {
            {
                let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
                *elapsed += by;
            }
            self.advanced.notify_waiters();
        }

        /// Virtual time passed since construction.
        pub fn elapsed(&self) -> Duration {
            *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn sleep_count(&self) -> usize {
            self.sleeps.load(Ordering::SeqCst)
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.fetch_add(1, Ordering::SeqCst);
            self.advance(duration);
            tokio::task::yield_now().await;
        }

        async fn sleep_until(&self, deadline: Instant) {
            loop {
                // Registered before the check so an advance in between is not missed.
                let advanced = self.advanced.notified();
                if self.now() >= deadline {
                    return;
                }
                advanced.await;
            }
        }
    }
}
