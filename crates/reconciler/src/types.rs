//! Core types for reconciliation.

use attrtree::{AttributeTree, RemoteModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle status of a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// No remote object is known
    Absent,
    /// A create call is in flight
    Creating,
    /// The remote object exists and `observed` reflects it
    Present,
    /// A delete call is in flight
    Deleting,
    /// A remote mutation succeeded but the follow-up wait or read failed
    Unknown,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Absent => "absent",
            Self::Creating => "creating",
            Self::Present => "present",
            Self::Deleting => "deleting",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// The unit of reconciliation: one remote object and what we know about it.
#[derive(Debug, Clone)]
pub struct ManagedResource {
    external_id: Option<String>,
    declared: AttributeTree,
    observed: AttributeTree,
    status: ResourceStatus,
}

impl Default for ManagedResource {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedResource {
    pub fn new() -> Self {
        Self {
            external_id: None,
            declared: AttributeTree::new(),
            observed: AttributeTree::new(),
            status: ResourceStatus::Absent,
        }
    }

    /// Identifier assigned by the remote system, once created
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Last declared intent
    pub fn declared(&self) -> &AttributeTree {
        &self.declared
    }

    /// Last state read from the remote system
    pub fn observed(&self) -> &AttributeTree {
        &self.observed
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub(crate) fn assign_id(&mut self, id: String) {
        self.external_id = Some(id);
    }

    pub(crate) fn set_declared(&mut self, declared: AttributeTree) {
        self.declared = declared;
    }

    pub(crate) fn set_status(&mut self, status: ResourceStatus) {
        self.status = status;
    }

    /// Record a fresh observation; the resource is present.
    pub(crate) fn observe(&mut self, observed: AttributeTree) {
        self.observed = observed;
        self.status = ResourceStatus::Present;
    }

    /// Drop everything known about the remote object.
    pub(crate) fn forget(&mut self) {
        self.external_id = None;
        self.observed = AttributeTree::new();
        self.status = ResourceStatus::Absent;
    }

    pub(crate) fn mark_unknown(&mut self) {
        self.status = ResourceStatus::Unknown;
    }
}

/// Classification of a long-running operation's status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Target,
    /// Any status in neither set, including ones the API never documented
    Error,
}

/// An in-flight asynchronous remote action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    /// Opaque token the client uses to refresh the status
    pub token: String,
    pub pending_states: BTreeSet<String>,
    pub target_states: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    /// Identifier of the object the operation acts on, when known
    pub target: Option<String>,
    /// Status reported with the handle, checked before the first poll
    pub initial_status: Option<String>,
}

impl OperationHandle {
    pub fn new<P, T>(token: impl Into<String>, pending: P, target: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            token: token.into(),
            pending_states: pending.into_iter().map(Into::into).collect(),
            target_states: target.into_iter().map(Into::into).collect(),
            created_at: Utc::now(),
            target: None,
            initial_status: None,
        }
    }

    /// Set the identifier of the object being acted on
    pub fn for_object(mut self, id: impl Into<String>) -> Self {
        self.target = Some(id.into());
        self
    }

    pub fn with_initial_status(mut self, status: impl Into<String>) -> Self {
        self.initial_status = Some(status.into());
        self
    }

    pub fn classify(&self, status: &str) -> OperationState {
        if self.target_states.contains(status) {
            OperationState::Target
        } else if self.pending_states.contains(status) {
            OperationState::Pending
        } else {
            OperationState::Error
        }
    }
}

/// Outcome of a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    /// The call completed synchronously
    Complete(RemoteModel),
    /// The call started a long-running operation
    Pending(OperationHandle),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let handle = OperationHandle::new("op-1", ["PENDING", "RUNNING"], ["DONE"]);
        assert_eq!(handle.classify("RUNNING"), OperationState::Pending);
        assert_eq!(handle.classify("DONE"), OperationState::Target);
        assert_eq!(handle.classify("FAILED"), OperationState::Error);
        // Status strings are matched exactly
        assert_eq!(handle.classify("done"), OperationState::Error);
    }

    #[test]
    fn test_managed_resource_lifecycle() {
        let mut resource = ManagedResource::new();
        assert_eq!(resource.status(), ResourceStatus::Absent);
        assert!(resource.external_id().is_none());

        resource.assign_id("proj".to_string());
        resource.observe(AttributeTree::new().with("name", "proj"));
        assert_eq!(resource.status(), ResourceStatus::Present);
        assert_eq!(resource.external_id(), Some("proj"));

        resource.forget();
        assert_eq!(resource.status(), ResourceStatus::Absent);
        assert!(resource.external_id().is_none());
        assert!(resource.observed().is_empty());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ResourceStatus::Deleting.to_string(), "deleting");
    }
}
