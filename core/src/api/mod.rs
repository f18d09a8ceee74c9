//! Public API: the engine, its options and the public error type.
//!
//! # Example
//!
//! ```
//! use morph_core::api::{Engine, EngineOptions};
//! use morph_core::nodes::{Expr, RootNode};
//! use morph_core::values::Value;
//!
//! let engine = Engine::new(EngineOptions::default());
//! let target = engine.call_target(RootNode::expr(
//!     "sum",
//!     Expr::add(Expr::arg(0), Expr::add(Expr::arg(2), Expr::arg(1))),
//! ));
//! let result = engine
//!     .run(&target, &[Value::Int(5), Value::Float(0.5), Value::Int(11)])
//!     .unwrap();
//! assert_eq!(result, Value::Float(16.5));
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::Engine;
pub use error::Error;
pub use options::{DEFAULT_CACHE_LIMIT, EngineOptions, ExecutionOptions, MAX_CHAIN_LIMIT};
