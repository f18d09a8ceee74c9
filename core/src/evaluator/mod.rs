//! Tree-walking evaluator for the node graph.
//!
//! An [`Activation`] walks a call target's nodes, reading arguments and frame
//! slots and consulting each node's specialization and cache state.
//!
//! ## Design Principles
//!
//! - **Never panic**: malformed graphs surface as [`RuntimeError`]s
//! - **Stack-safe**: depth tracking turns runaway nesting into
//!   [`ResourceExceededError::StackOverflow`]
//! - **Transparent**: specialization and caching never change a result
//!
//! ## Example
//!
//! ```
//! use morph_core::api::Engine;
//! use morph_core::nodes::{Expr, RootNode};
//! use morph_core::values::Value;
//!
//! let engine = Engine::default();
//! let target = engine.call_target(RootNode::expr("add", Expr::add(Expr::arg(0), Expr::int(1))));
//! assert_eq!(target.invoke(&[Value::Int(41)]).unwrap(), Value::Int(42));
//! ```

mod error;
mod eval;
pub(crate) mod operators;

#[cfg(test)]
mod eval_test;

pub use error::{ExecutionError, ExecutionErrorKind, ResourceExceededError, RuntimeError};
pub use eval::Activation;

/// Result of evaluating one node. The call target attaches its name when the
/// error leaves the activation.
pub type EvalResult<T> = Result<T, ExecutionErrorKind>;
