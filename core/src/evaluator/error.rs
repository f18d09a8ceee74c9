//! Runtime evaluation errors.
//!
//! Every error here is fatal to the current activation: the node graph was
//! built inconsistently with the values it received. Deoptimization events and
//! cache misses are never errors and never surface here.
//!
//! # Error Categories
//!
//! - **Runtime errors**: precondition violations detected while evaluating a
//!   node (uninitialized slot read, out-of-bounds index, unsupported operand
//!   combination).
//!
//! - **Resource exceeded errors**: evaluation resource limits (expression
//!   nesting depth).

use thiserror::Error;

use crate::{casting::ReadKind, values::ValueKind};

/// Error raised by an activation, tagged with the call target it ran in.
#[derive(Debug, Error)]
#[error("{kind} (in `{target}`)")]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub target: String,
}

#[derive(Debug, Error)]
pub enum ExecutionErrorKind {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceededError),
}

/// Precondition violations detected during evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Read of uninitialized frame slot {slot}")]
    UninitializedRead { slot: usize },

    #[error("Frame slot {slot} holds {found}, expected {expected:?}")]
    TypeMismatch {
        slot: usize,
        expected: ReadKind,
        found: ValueKind,
    },

    #[error("Frame slot {slot} out of bounds (frame size: {size})")]
    SlotOutOfBounds { slot: usize, size: usize },

    #[error("Unsupported operands for `{op}`: {left} and {right}")]
    UnsupportedOperands {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("Argument {index} out of bounds ({len} arguments)")]
    ArgumentOutOfBounds { index: usize, len: usize },

    #[error("Index {index} out of bounds (length: {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("Expected a Bool condition, found {found}")]
    NotABoolean { found: ValueKind },

    #[error("Expected an array, found {found}")]
    NotAnArray { found: ValueKind },

    #[error("Expected an Int index, found {found}")]
    NotAnIndex { found: ValueKind },
}

/// Resource limits exceeded during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceExceededError {
    #[error("Evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },
}

impl ExecutionError {
    pub fn new(kind: impl Into<ExecutionErrorKind>, target: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
        }
    }

    /// The runtime error, if this is one.
    pub fn runtime(&self) -> Option<&RuntimeError> {
        match &self.kind {
            ExecutionErrorKind::Runtime(e) => Some(e),
            ExecutionErrorKind::ResourceExceeded(_) => None,
        }
    }
}
