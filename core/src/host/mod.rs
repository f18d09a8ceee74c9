//! The execution host: invalidation tokens and call targets.

pub mod assumption;
pub mod call_target;

pub use assumption::{Assumption, CodeGeneration, StableFlag};
pub use call_target::{CallTarget, TargetState, TargetStats, Tier};
