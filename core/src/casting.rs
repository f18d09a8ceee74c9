//! Implicit coercion rules.
//!
//! The only implicit conversion is the lossless widening `Int -> Float`,
//! applied wherever a consumer expects a float and receives an integer. The
//! reverse never happens implicitly.

use thiserror::Error;

use crate::values::{Value, ValueKind};

/// The value kind a reading node statically expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadKind {
    /// Accept any value unchanged.
    #[default]
    Any,
    /// Require an integer.
    Int,
    /// Require a number; integers are widened.
    Float,
}

/// Widen a numeric value to `f64`. Returns `None` for non-numeric values.
#[inline]
pub fn widen_to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        _ => None,
    }
}

/// Check `value` against `expect`, applying the implicit widening.
pub fn coerce(value: Value, expect: ReadKind) -> Result<Value, CastError> {
    match (expect, &value) {
        (ReadKind::Any, _) | (ReadKind::Int, Value::Int(_)) | (ReadKind::Float, Value::Float(_)) => {
            Ok(value)
        }
        (ReadKind::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
        _ => Err(CastError::NoImplicitCast {
            from: value.kind(),
            to: expect,
        }),
    }
}

/// Errors from implicit coercion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("no implicit cast from {from} to {to:?}")]
    NoImplicitCast { from: ValueKind, to: ReadKind },
}
