//! Error types for cursor operations.

use thiserror::Error;

use super::CursorState;

/// Structured error types for cursor operations.
///
/// Failures raised by a [`PageFetcher`](super::PageFetcher) are not wrapped
/// here; they reach the caller unchanged.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CursorError {
    /// The operation is only allowed in another state
    #[error("Cannot {operation} a cursor in state {state}")]
    InvalidState {
        state: CursorState,
        operation: &'static str,
    },

    /// A continuation token that the fetcher cannot interpret
    #[error("Invalid page state: {page_state}")]
    InvalidPageState { page_state: String },
}

impl CursorError {
    /// Check if this error is a state machine violation
    pub fn is_state_error(&self) -> bool {
        matches!(self, CursorError::InvalidState { .. })
    }

    /// Get the cursor state carried by a state violation
    pub fn state(&self) -> Option<CursorState> {
        match self {
            CursorError::InvalidState { state, .. } => Some(*state),
            _ => None,
        }
    }
}

impl From<CursorError> for crate::Error {
    fn from(err: CursorError) -> Self {
        crate::Error::Cursor(err)
    }
}
