//! Error types for reconciliation.
//!
//! Remote failures are classified up front so the retry envelope can tell
//! transient conditions (throttling, eventual consistency) from permanent
//! ones. Every reconciler error carries enough context (identifier, field
//! path, last remote status) to diagnose it without querying the remote
//! system again.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Kinds of failure reported by a remote control-plane call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Rate limiting (transient)
    Throttled,
    /// Service unavailable or internal error (transient)
    Unavailable,
    /// A dependency is not visible yet, e.g. a freshly created role (transient)
    EventualConsistency,
    /// Concurrent modification in progress (transient)
    Conflict,
    /// The object does not exist
    NotFound,
    /// Credentials rejected or action not permitted
    Unauthorized,
    /// The request was rejected as invalid
    Invalid,
    /// Anything else
    Other,
}

impl RemoteErrorKind {
    /// Whether this kind of failure is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Throttled | Self::Unavailable | Self::EventualConsistency | Self::Conflict
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Throttled => "Request throttled",
            Self::Unavailable => "Service unavailable",
            Self::EventualConsistency => "Dependency not yet visible",
            Self::Conflict => "Conflicting operation in progress",
            Self::NotFound => "Object not found",
            Self::Unauthorized => "Not authorized",
            Self::Invalid => "Request rejected",
            Self::Other => "Remote error",
        }
    }
}

/// A failure returned by a [`RemoteClient`](crate::RemoteClient) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    /// HTTP-like status code, when the transport has one
    pub code: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    /// Classify a failed call from its status code and message.
    ///
    /// Known message patterns win over the status code: some APIs report
    /// throttling or permission propagation delays as plain 400s.
    pub fn from_status(code: u16, message: &str) -> Self {
        let lower = message.to_lowercase();

        let kind = if lower.contains("throttl")
            || lower.contains("rate exceeded")
            || lower.contains("too many requests")
        {
            RemoteErrorKind::Throttled
        } else if (lower.contains("not authorized") && lower.contains("sts:assumerole"))
            || lower.contains("role cannot be assumed")
        {
            RemoteErrorKind::EventualConsistency
        } else {
            match code {
                429 => RemoteErrorKind::Throttled,
                500..=599 => RemoteErrorKind::Unavailable,
                404 => RemoteErrorKind::NotFound,
                401 | 403 => RemoteErrorKind::Unauthorized,
                409 => RemoteErrorKind::Conflict,
                400 | 422 => RemoteErrorKind::Invalid,
                _ => RemoteErrorKind::Other,
            }
        };

        Self {
            kind,
            code: Some(code),
            message: message.trim().to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    /// Reclassify as an eventual-consistency failure.
    pub(crate) fn as_eventual(self) -> Self {
        Self {
            kind: RemoteErrorKind::EventualConsistency,
            ..self
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({code}): {}", self.kind.description(), self.message),
            None => write!(f, "{}: {}", self.kind.description(), self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Retryable failure that outlasted the retry budget
    Transient,
    /// Remote rejection or malformed remote data, never retried
    Permanent,
    /// A long-running operation ended in an error state
    OperationFailed,
    /// A long-running operation did not finish in time
    Timeout,
    /// The caller cancelled the work
    Cancelled,
    /// Programmer or configuration error, detected before any remote call
    Contract,
}

impl ErrorCategory {
    /// Whether trying the whole verb again later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient | Self::Timeout)
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent | Self::OperationFailed | Self::Contract)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Transient => "Transient remote failure",
            Self::Permanent => "Permanent remote failure",
            Self::OperationFailed => "Remote operation failed",
            Self::Timeout => "Timed out",
            Self::Cancelled => "Cancelled",
            Self::Contract => "Invalid request",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Self::Transient => "Try again later or raise the retry budget",
            Self::Permanent => "Check the declared attributes and remote permissions",
            Self::OperationFailed => "Inspect the remote operation for details",
            Self::Timeout => "Raise the wait timeout or check the remote operation",
            Self::Cancelled => "No action needed",
            Self::Contract => "Fix the declaration or schema before retrying",
        }
    }
}

/// Errors that can occur while reconciling a resource.
#[derive(Debug, Error)]
pub enum Error {
    /// Retryable failures continued until the duration budget was spent
    #[error("{context}: still failing after {attempts} attempts over {budget:?}: {source}")]
    Transient {
        context: String,
        attempts: u32,
        budget: Duration,
        source: RemoteError,
    },

    /// The remote system rejected the call
    #[error("{context}: {source}")]
    Remote { context: String, source: RemoteError },

    /// A long-running operation reached a status outside its pending and target sets
    #[error("operation {operation} failed with status {status:?}")]
    OperationFailed { operation: String, status: String },

    /// A long-running operation stayed pending past the wait timeout
    #[error("operation {operation} timed out after {timeout:?} (last status {last_status:?})")]
    OperationTimeout {
        operation: String,
        timeout: Duration,
        last_status: Option<String>,
    },

    /// The wait for a long-running operation was cancelled
    #[error("wait for operation {operation} cancelled")]
    OperationCancelled { operation: String },

    /// A retry sleep was cancelled
    #[error("{context}: cancelled")]
    Cancelled { context: String },

    /// The call was invalid for the resource's current state
    #[error("contract violation: {message}")]
    ContractViolation { message: String },

    /// An attribute that cannot change after creation was changed
    #[error("attribute {attribute} of {id} cannot change after creation")]
    ImmutableAttribute { attribute: String, id: String },

    /// A successful remote response lacked data it must carry
    #[error("malformed remote response: {message}")]
    MalformedResponse { message: String },

    /// Expanding or flattening the attribute tree failed
    #[error(transparent)]
    Codec(#[from] attrtree::Error),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Transient { .. } => ErrorCategory::Transient,
            Error::Remote { .. } | Error::MalformedResponse { .. } => ErrorCategory::Permanent,
            Error::OperationFailed { .. } => ErrorCategory::OperationFailed,
            Error::OperationTimeout { .. } => ErrorCategory::Timeout,
            Error::OperationCancelled { .. } | Error::Cancelled { .. } => ErrorCategory::Cancelled,
            Error::ContractViolation { .. } | Error::ImmutableAttribute { .. } => {
                ErrorCategory::Contract
            }
            Error::Codec(e) => match e.category() {
                attrtree::ErrorCategory::Malformed => ErrorCategory::Permanent,
                attrtree::ErrorCategory::Contract => ErrorCategory::Contract,
            },
        }
    }

    /// Whether this is a contract violation detected before any remote call.
    pub fn is_contract_violation(&self) -> bool {
        self.category() == ErrorCategory::Contract
    }

    /// The underlying remote error, if any.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Error::Transient { source, .. } | Error::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn contract(message: impl Into<String>) -> Self {
        Error::ContractViolation {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;
