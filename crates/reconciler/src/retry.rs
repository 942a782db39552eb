//! Bounded-duration retry for remote mutating calls.
//!
//! The budget is total elapsed time, not an attempt count: throttling and
//! permission propagation delays clear after a while, however many calls
//! that takes.

use crate::cancel::CancelToken;
use crate::clock::{Clock, Sleep};
use crate::config::RetryConfig;
use crate::error::{Error, RemoteError, Result};

/// Callback trait for retry progress notifications.
pub trait RetryCallback {
    /// Called before sleeping ahead of another attempt.
    ///
    /// # Arguments
    /// * `context` - What is being retried
    /// * `attempt` - Attempt that just failed (1-indexed)
    /// * `error` - The error that triggered the retry
    /// * `delay` - Time until the next attempt
    fn on_retry(&self, context: &str, attempt: u32, error: &RemoteError, delay: std::time::Duration);
}

/// No-op callback that does nothing.
pub struct NoCallback;

impl RetryCallback for NoCallback {
    fn on_retry(&self, _context: &str, _attempt: u32, _error: &RemoteError, _delay: std::time::Duration) {}
}

/// Callback that logs each retry at warn level.
pub struct LogCallback;

impl RetryCallback for LogCallback {
    fn on_retry(&self, context: &str, attempt: u32, error: &RemoteError, delay: std::time::Duration) {
        log::warn!(
            "{context}: attempt {attempt} failed: {error}. Retrying in {:.1}s...",
            delay.as_secs_f64()
        );
    }
}

/// Retry `operation` while it fails with retryable errors and budget remains.
///
/// Always makes at least one attempt. Returns at once on success or on a
/// permanent failure ([`Error::Remote`]). When the budget runs out the last
/// retryable failure is returned as [`Error::Transient`]. Sleeping between
/// attempts is cut short by `cancel` ([`Error::Cancelled`]).
pub fn retry_until<T, F>(
    context: &str,
    config: &RetryConfig,
    clock: &dyn Clock,
    cancel: &CancelToken,
    callback: Option<&dyn RetryCallback>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> std::result::Result<T, RemoteError>,
{
    let started = clock.now();
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                context: context.to_string(),
            });
        }

        let error = match operation() {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        attempt += 1;

        if !error.is_retryable() {
            return Err(Error::Remote {
                context: context.to_string(),
                source: error,
            });
        }

        let elapsed = clock.now().saturating_duration_since(started);
        let remaining = config.max_duration.saturating_sub(elapsed);
        if remaining.is_zero() {
            return Err(Error::Transient {
                context: context.to_string(),
                attempts: attempt,
                budget: config.max_duration,
                source: error,
            });
        }

        let delay = config.delay_for_attempt(attempt - 1).min(remaining);
        if let Some(cb) = callback {
            cb.on_retry(context, attempt, &error, delay);
        }
        log::debug!("{context}: retryable failure on attempt {attempt}: {error}");

        if clock.sleep(delay, cancel) == Sleep::Cancelled {
            return Err(Error::Cancelled {
                context: context.to_string(),
            });
        }
    }
}
