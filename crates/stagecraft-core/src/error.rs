#![forbid(unsafe_code)]

//! Error taxonomy shared by every Stagecraft crate.
//!
//! All failures are local, synchronous, and non-retryable: the caller has to
//! fix the request. An operation that returns an error has not changed any
//! state.

/// Result alias used across the workspace.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by curve construction, clock configuration, and the stage.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A rate, curve resolution, or amplification factor is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A view or dialog name that was never registered.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request collides with live state, e.g. unregistering the active view.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl EngineError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
