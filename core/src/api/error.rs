//! Public error types.
//!
//! Internal errors are converted to these types at API boundaries.

use thiserror::Error;

/// Public error type for all engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid API usage (e.g., wrong argument count).
    #[error("API error: {0}")]
    Api(String),

    /// Runtime errors during evaluation (e.g., uninitialized read, index out of bounds).
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Resource limits exceeded (e.g., stack overflow).
    #[error("Resource limit exceeded: {0}")]
    ResourceExceeded(String),
}

impl From<crate::evaluator::ExecutionError> for Error {
    fn from(err: crate::evaluator::ExecutionError) -> Self {
        use crate::evaluator::ExecutionErrorKind::*;
        match err.kind {
            ResourceExceeded(res_err) => Error::ResourceExceeded(format!("{}", res_err)),
            Runtime(runtime_err) => Error::Runtime(format!("{}", runtime_err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{ExecutionError, ResourceExceededError, RuntimeError};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_execution_error_conversion() {
        let err = ExecutionError::new(RuntimeError::UninitializedRead { slot: 2 }, "main");
        assert_eq!(
            Error::from(err),
            Error::Runtime("Read of uninitialized frame slot 2".into())
        );

        let err = ExecutionError::new(
            ResourceExceededError::StackOverflow {
                depth: 3,
                max_depth: 3,
            },
            "main",
        );
        assert!(matches!(Error::from(err), Error::ResourceExceeded(_)));
    }
}
