//! Polling state machine for long-running remote operations.

use crate::cancel::CancelToken;
use crate::clock::{Clock, Sleep};
use crate::config::WaitConfig;
use crate::error::{Error, RemoteError, Result};
use crate::types::{OperationHandle, OperationState};

/// Drives an [`OperationHandle`] from a pending status to a terminal one.
///
/// Each poll classifies the refreshed status against the handle's pending
/// and target sets. A target status ends the wait successfully. A status in
/// neither set fails it immediately, so an undocumented remote status can
/// never leave the waiter spinning. Retryable refresh errors count as
/// pending; permanent ones stop the wait.
pub struct OperationWaiter<'a> {
    config: &'a WaitConfig,
    clock: &'a dyn Clock,
    cancel: &'a CancelToken,
}

impl<'a> OperationWaiter<'a> {
    pub fn new(config: &'a WaitConfig, clock: &'a dyn Clock, cancel: &'a CancelToken) -> Self {
        Self {
            config,
            clock,
            cancel,
        }
    }

    /// Poll `refresh` until the operation reaches a target status.
    ///
    /// Returns the target status string observed.
    pub fn wait<F>(&self, handle: &OperationHandle, mut refresh: F) -> Result<String>
    where
        F: FnMut(&OperationHandle) -> std::result::Result<String, RemoteError>,
    {
        let operation = handle.token.clone();

        if let Some(status) = &handle.initial_status {
            match handle.classify(status) {
                OperationState::Target => return Ok(status.clone()),
                OperationState::Error => {
                    return Err(Error::OperationFailed {
                        operation,
                        status: status.clone(),
                    });
                }
                OperationState::Pending => {}
            }
        }

        let started = self.clock.now();
        let mut last_status = handle.initial_status.clone();
        let mut poll: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::OperationCancelled { operation });
            }

            match refresh(handle) {
                Ok(status) => {
                    log::debug!("Progress of operation {operation}: {status:?}");
                    match handle.classify(&status) {
                        OperationState::Target => return Ok(status),
                        OperationState::Error => {
                            return Err(Error::OperationFailed { operation, status });
                        }
                        OperationState::Pending => last_status = Some(status),
                    }
                }
                Err(e) if e.is_retryable() => {
                    log::debug!("Refreshing operation {operation} failed, will poll again: {e}");
                }
                Err(e) => {
                    return Err(Error::Remote {
                        context: format!("refreshing operation {operation}"),
                        source: e,
                    });
                }
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            if elapsed >= self.config.timeout {
                return Err(Error::OperationTimeout {
                    operation,
                    timeout: self.config.timeout,
                    last_status,
                });
            }

            let interval = self
                .config
                .interval_for_poll(poll)
                .min(self.config.timeout - elapsed);
            poll += 1;

            if self.clock.sleep(interval, self.cancel) == Sleep::Cancelled {
                return Err(Error::OperationCancelled { operation });
            }
        }
    }
}
