//! Error types for attribute tree operations.
//!
//! Errors fall in two categories: contract violations (the declared tree or
//! the schema is wrong, caught before anything is sent) and malformed remote
//! data (a response that does not match the schema). Neither is retryable.

use thiserror::Error;

/// Categories of attribute tree errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Schema or declared tree is invalid
    Contract,
    /// Remote data does not match the schema
    Malformed,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Contract => "Invalid configuration",
            Self::Malformed => "Malformed remote response",
        }
    }
}

/// Errors raised while validating, expanding or flattening attribute trees.
///
/// Every variant carries the dotted attribute path it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The schema itself is inconsistent
    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },

    /// A required attribute is missing from the declared tree
    #[error("missing required attribute: {path}")]
    MissingRequired { path: String },

    /// The declared tree has an attribute the schema does not know
    #[error("unknown attribute: {path}")]
    UnknownAttribute { path: String },

    /// The declared value has the wrong kind for its attribute
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A single-element block was declared with zero elements
    #[error("block {path} requires exactly one element, found none")]
    EmptySingleBlock { path: String },

    /// Two declared set members share an identity but differ in content
    #[error("block set {path} has conflicting members with identity {identity}")]
    DuplicateIdentity { path: String, identity: String },

    /// Remote data does not match the schema
    #[error("malformed remote data at {path}: {message}")]
    Malformed { path: String, message: String },

    /// A JSON document could not be read as an attribute tree
    #[error("invalid document at {path}: {message}")]
    Document { path: String, message: String },
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Malformed { .. } => ErrorCategory::Malformed,
            _ => ErrorCategory::Contract,
        }
    }

    pub(crate) fn malformed(path: &str, message: impl Into<String>) -> Self {
        Error::Malformed {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for attribute tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Join a parent path and a child segment with a dot.
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category() {
        let err = Error::malformed("artifacts.type", "absent");
        assert_eq!(err.category(), ErrorCategory::Malformed);

        let err = Error::MissingRequired {
            path: "name".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Contract);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "name"), "name");
        assert_eq!(join_path("source.0", "auth"), "source.0.auth");
    }
}
