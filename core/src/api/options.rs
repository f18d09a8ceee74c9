//! Configuration options for the engine.

/// Upper bound on every inline cache chain.
pub const DEFAULT_CACHE_LIMIT: usize = 2;

pub use crate::cache::chain::MAX_CHAIN_LIMIT;

/// Configuration options for call target execution.
///
/// These options control resource limits and the simulated tiering of a call
/// target.
///
/// # Example
///
/// ```
/// use morph_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_depth: 500,
///     ..ExecutionOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum node nesting depth (for recursion protection).
    ///
    /// Default: 1000
    pub max_depth: usize,

    /// Interpreted invocations before the call target is compiled.
    ///
    /// Default: 1000
    pub compile_threshold: u64,

    /// Interpreted loop iterations before the loop is handed over through
    /// on-stack replacement.
    ///
    /// Default: 10_000
    pub osr_threshold: u64,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            compile_threshold: 1000,
            osr_threshold: 10_000,
        }
    }
}

/// Configuration options for the engine.
///
/// # Example
///
/// ```
/// use morph_core::api::{EngineOptions, ExecutionOptions};
///
/// let options = EngineOptions {
///     default_execution_options: ExecutionOptions {
///         compile_threshold: 10,
///         ..ExecutionOptions::default()
///     },
///     cache_limit: 4,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Default options for call targets.
    ///
    /// These can be overridden with `Engine::call_target_with()`.
    pub default_execution_options: ExecutionOptions,

    /// Bound on the length of every inline cache chain.
    ///
    /// Values above [`MAX_CHAIN_LIMIT`] (255) are capped to it, with a
    /// warning when the engine is created.
    ///
    /// Default: [`DEFAULT_CACHE_LIMIT`]
    pub cache_limit: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_execution_options: ExecutionOptions::default(),
            cache_limit: DEFAULT_CACHE_LIMIT,
        }
    }
}
