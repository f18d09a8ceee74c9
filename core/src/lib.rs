//! Core of the morph adaptive evaluator.
//!
//! A call target's body is a tree of nodes that specializes itself to the
//! values it sees: arithmetic sites narrow to the operand types observed so
//! far, name and element lookups go through small bounded inline caches, and
//! frame slots pick an unboxed representation on first write. Every such
//! decision bumps the call target's code generation, which is how the host
//! knows to drop code compiled against the old decision.

pub mod api;
pub mod cache;
pub mod casting;
pub mod evaluator;
pub mod frame;
pub mod host;
pub mod nodes;
pub mod programs;
pub mod specialize;
pub mod values;
