//! Time source for the retry envelope and the operation waiter.
//!
//! Production code uses [`SystemClock`]. [`ManualClock`] advances virtual
//! time on every sleep, so timeouts of minutes can be tested instantly.

use crate::cancel::CancelToken;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How a sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sleep {
    Elapsed,
    Cancelled,
}

/// A monotonic clock with cancellable sleep.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Sleep for `duration` unless `cancel` fires first.
    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> Sleep;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> Sleep {
        if cancel.wait_timeout(duration) {
            Sleep::Cancelled
        } else {
            Sleep::Elapsed
        }
    }
}

/// Virtual time that only moves when slept on or advanced.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }

    /// Virtual time elapsed since construction
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> Sleep {
        if cancel.is_cancelled() {
            return Sleep::Cancelled;
        }
        self.advance(duration);
        Sleep::Elapsed
    }
}
