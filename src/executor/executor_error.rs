use std::fmt::Display;

use crate::executor::BackendError;

/// Failure of a single aggregation request. Never fatal to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    Backend(BackendError),
    /// Transport succeeded but the payload carried an `error` field
    Embedded(String),
    /// Payload could not be decoded or had an unexpected shape
    Malformed(String),
}

impl Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::Backend(err) => write!(f, "{err}"),
            ExecutorError::Embedded(msg) => write!(f, "backend reported an error: {msg}"),
            ExecutorError::Malformed(msg) => write!(f, "malformed backend payload: {msg}"),
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutorError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for ExecutorError {
    fn from(err: BackendError) -> Self {
        ExecutorError::Backend(err)
    }
}
