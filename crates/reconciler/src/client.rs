//! Remote control-plane client seam.

use crate::error::{RemoteError, RemoteErrorKind};
use crate::types::{OperationHandle, Submitted};
use attrtree::RemoteModel;
use std::sync::Arc;

/// Request/response access to one remote resource type.
///
/// Implementations own transport and authentication. Errors must be
/// classified (see [`RemoteError::from_status`]) so the reconciler can
/// tell transient failures from permanent ones; a missing object must be
/// reported with [`RemoteErrorKind::NotFound`].
pub trait RemoteClient: Send + Sync {
    /// Create an object from a wire request.
    fn create(&self, request: &RemoteModel) -> Result<Submitted, RemoteError>;

    /// Fetch an object by identifier.
    fn get(&self, id: &str) -> Result<RemoteModel, RemoteError>;

    /// Update an object in place.
    fn update(&self, id: &str, request: &RemoteModel) -> Result<Submitted, RemoteError>;

    /// Delete an object, optionally returning an operation to wait on.
    fn delete(&self, id: &str) -> Result<Option<OperationHandle>, RemoteError>;

    /// Refresh the status string of a long-running operation.
    fn operation_status(&self, handle: &OperationHandle) -> Result<String, RemoteError> {
        Err(RemoteError::new(
            RemoteErrorKind::Invalid,
            format!("client does not support asynchronous operations ({})", handle.token),
        ))
    }
}

impl<C: RemoteClient + ?Sized> RemoteClient for Arc<C> {
    fn create(&self, request: &RemoteModel) -> Result<Submitted, RemoteError> {
        (**self).create(request)
    }

    fn get(&self, id: &str) -> Result<RemoteModel, RemoteError> {
        (**self).get(id)
    }

    fn update(&self, id: &str, request: &RemoteModel) -> Result<Submitted, RemoteError> {
        (**self).update(id, request)
    }

    fn delete(&self, id: &str) -> Result<Option<OperationHandle>, RemoteError> {
        (**self).delete(id)
    }

    fn operation_status(&self, handle: &OperationHandle) -> Result<String, RemoteError> {
        (**self).operation_status(handle)
    }
}
