//! Cooperative shutdown and interruptible waiting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularity of [`ThreadSleeper`] waits
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// A flag shared between the poller and whoever may stop it
///
/// Clones observe the same flag. Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Waits between poll cycles
pub trait Sleeper {
    /// Wait for `duration`, returning early once `shutdown` is triggered
    fn sleep(&self, duration: Duration, shutdown: &ShutdownSignal);
}

impl<Z: Sleeper + ?Sized> Sleeper for &Z {
    fn sleep(&self, duration: Duration, shutdown: &ShutdownSignal) {
        (**self).sleep(duration, shutdown);
    }
}

/// Sleeps the current thread in short slices, checking the shutdown flag
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, shutdown: &ShutdownSignal) {
        let deadline = Instant::now() + duration;
        loop {
            if shutdown.is_triggered() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}
