//! Error types for document operations.
//!
//! Path grammar violations live in [`PathError`](super::PathError); this
//! module covers everything that can go wrong once a path has been parsed:
//! writes through an empty path, typed reads of the wrong kind, list index
//! bounds and JSON conversion.

use thiserror::Error;

/// Structured error types for document operations.
///
/// A missing key or index is never an error: readers report it as `None`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocError {
    /// A path with no segments was given to an operation that needs a target
    #[error("Empty path is not allowed for {operation}")]
    EmptyPath { operation: &'static str },

    /// A value exists at the path but has an incompatible kind
    #[error("Type mismatch at '{path}': expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// List index outside of the list bounds
    #[error("List index {index} out of bounds (length {len})")]
    ListIndexOutOfBounds { index: usize, len: usize },

    /// JSON input that cannot be represented as a document
    #[error("Invalid JSON document: {reason}")]
    InvalidJson { reason: String },

    /// Mapping a typed object into a document failed
    #[error("Document serialization failed: {reason}")]
    SerializationFailed { reason: String },

    /// Mapping a document into a typed object failed
    #[error("Document deserialization failed: {reason}")]
    DeserializationFailed { reason: String },
}

impl DocError {
    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, DocError::TypeMismatch { .. })
    }

    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            DocError::SerializationFailed { .. }
                | DocError::DeserializationFailed { .. }
                | DocError::InvalidJson { .. }
        )
    }

    /// Check if this error is related to list bounds
    pub fn is_index_error(&self) -> bool {
        matches!(self, DocError::ListIndexOutOfBounds { .. })
    }

    /// Get the path if this is a path-related error
    pub fn path(&self) -> Option<&str> {
        match self {
            DocError::TypeMismatch { path, .. } if !path.is_empty() => Some(path),
            _ => None,
        }
    }

    /// Attaches the path a type mismatch was found at.
    pub(crate) fn at_path(self, at: &str) -> Self {
        match self {
            DocError::TypeMismatch {
                expected, actual, ..
            } => DocError::TypeMismatch {
                path: at.to_string(),
                expected,
                actual,
            },
            other => other,
        }
    }
}

impl From<DocError> for crate::Error {
    fn from(err: DocError) -> Self {
        crate::Error::Doc(err)
    }
}

impl From<super::PathError> for crate::Error {
    fn from(err: super::PathError) -> Self {
        crate::Error::Path(err)
    }
}
