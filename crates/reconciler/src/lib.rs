//! # reconciler
//!
//! Drive a remote infrastructure object to match a declared attribute tree.
//!
//! This crate provides functionality for:
//! - Creating, reading, updating and deleting one remote object per [`Reconciler`]
//! - Retrying transient remote failures within a total duration budget
//! - Waiting on long-running remote operations with a bounded timeout
//! - Cancelling blocked waits from another thread
//!
//! The remote API is reached through the [`RemoteClient`] trait; transport
//! and authentication belong to its implementations.
//!
//! ## Example
//!
//! ```no_run
//! use reconciler::{Reconciler, ReconcilerConfig, RemoteClient};
//! use attrtree::{AttributeTree, ResourceSchema};
//!
//! fn converge<C: RemoteClient>(client: C, schema: ResourceSchema, declared: AttributeTree) -> reconciler::Result<()> {
//!     let mut reconciler = Reconciler::new(client, schema, ReconcilerConfig::default())?;
//!     reconciler.create(declared)?;
//!     println!("created {:?}", reconciler.external_id());
//!     Ok(())
//! }
//! ```
//!
//! ## Cancellation
//!
//! Every reconciler owns a [`CancelToken`]. Share one with
//! [`Reconciler::with_cancel_token`] and call [`CancelToken::cancel`] from
//! another thread to stop retry sleeps and operation polling promptly.

mod cancel;
mod client;
mod clock;
mod config;
mod error;
mod reconciler;
mod retry;
mod types;
mod waiter;

#[cfg(test)]
mod testing;

pub use cancel::CancelToken;
pub use client::RemoteClient;
pub use clock::{Clock, ManualClock, Sleep, SystemClock};
pub use config::{ReconcilerConfig, RetryConfig, WaitConfig};
pub use error::{Error, ErrorCategory, RemoteError, RemoteErrorKind, Result};
pub use reconciler::Reconciler;
pub use retry::{LogCallback, NoCallback, RetryCallback, retry_until};
pub use types::{ManagedResource, OperationHandle, OperationState, ResourceStatus, Submitted};
pub use waiter::OperationWaiter;
