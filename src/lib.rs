//! Morph - an adaptive tree-walking evaluator
//!
//! # Overview
//!
//! Morph runs hand-built node graphs that specialize themselves to the values
//! they observe:
//!
//! - Arithmetic narrows to `Int` or `Float` paths, widening when it must
//! - Name and element lookups go through small, bounded inline caches
//! - Local variables pick an unboxed representation on first write
//! - Loops hand a live frame over to a simulated compiled tier (OSR)
//!
//! Every specialization decision is published atomically, so one graph can
//! serve many concurrent invocations.
//!
//! # Quick Start
//!
//! ```
//! use morph::{Engine, EngineOptions, Value, programs};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let target = engine.call_target(programs::sum_chain());
//!
//! let args = [Value::Int(5), Value::Float(0.25), Value::Int(11)];
//! assert_eq!(engine.run(&target, &args).unwrap(), Value::Float(16.25));
//! ```
//!
//! # Building graphs
//!
//! ```
//! use morph::{Engine, Value};
//! use morph::nodes::{Expr, RootNode, Stmt};
//!
//! let engine = Engine::default();
//! let root = RootNode::stmt(
//!     "double",
//!     1,
//!     Stmt::block([
//!         Stmt::write(0, Expr::arg(0)),
//!         Stmt::ret(Expr::add(Expr::read(0), Expr::read(0))),
//!     ]),
//! );
//! let target = engine.call_target(root);
//! assert_eq!(target.invoke(&[Value::Int(21)]).unwrap(), Value::Int(42));
//! ```

// Re-export public API from morph_core
pub use morph_core::api::{Engine, EngineOptions, Error, ExecutionOptions};

// Re-export commonly used types and values
pub use morph_core::host::{Assumption, CallTarget, StableFlag, TargetStats, Tier};
pub use morph_core::values::{self, ArrayItems, ArrayLike, Value};
pub use morph_core::{nodes, programs};

// Re-export errors
pub use morph_core::evaluator::{ExecutionError, RuntimeError};

#[cfg(feature = "bn")]
pub use morph_bn as bn;
