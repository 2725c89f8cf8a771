//! Core error type

use crate::state::{LuaType, Status};
use thiserror::Error;

/// Failures surfaced by composite operations.
///
/// Reads of absent or mistyped slots are not errors; they come back as `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("runtime state allocation failed")]
    StateAllocation,

    /// Chunk failed to load; the message was popped from the stack
    #[error("{status} while loading: {message}")]
    Load { status: Status, message: String },

    /// Protected invocation failed; the message was popped from the stack
    #[error("{status}: {message}")]
    Call { status: Status, message: String },

    #[error("name contains an interior NUL byte: {0:?}")]
    InvalidName(String),

    #[error("expected a table at index {index}, found {found}")]
    NotATable { index: i32, found: LuaType },

    #[error("stack cannot grow by {0} slots")]
    StackExhausted(i32),

    #[error("{0} values cannot be rebuilt from a snapshot")]
    NotPushable(LuaType),
}

impl CoreError {
    /// Runtime status behind the error, if it came from the runtime
    pub fn status(&self) -> Option<Status> {
        match self {
            CoreError::Load { status, .. } | CoreError::Call { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message carried by the runtime's error object, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CoreError::Load { message, .. } | CoreError::Call { message, .. } => Some(message),
            _ => None,
        }
    }
}
