//! The engine: shared name registry plus default options.

use std::sync::Arc;

use tracing::warn;

use super::{EngineOptions, Error, ExecutionOptions, MAX_CHAIN_LIMIT};
use crate::{cache::NameRegistry, host::CallTarget, nodes::RootNode, values::Value};

/// Creates call targets that share one name registry.
///
/// # Example
///
/// ```
/// use morph_core::api::{Engine, EngineOptions};
/// use morph_core::nodes::{Expr, RootNode};
/// use morph_core::values::Value;
///
/// let engine = Engine::new(EngineOptions::default());
/// engine.add_mapping("kuk", 66);
///
/// let target = engine.call_target(RootNode::expr("lookup", Expr::resolve("kuk")));
/// assert_eq!(engine.run(&target, &[]).unwrap(), Value::Int(66));
/// ```
#[derive(Debug)]
pub struct Engine {
    options: EngineOptions,
    names: Arc<NameRegistry>,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        if options.cache_limit > MAX_CHAIN_LIMIT {
            warn!(
                requested = options.cache_limit,
                max = MAX_CHAIN_LIMIT,
                "cache limit capped"
            );
        }
        let names = Arc::new(NameRegistry::new(options.cache_limit));
        Self { options, names }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn names(&self) -> &Arc<NameRegistry> {
        &self.names
    }

    /// Map `name` to `id` for every call target of this engine.
    pub fn add_mapping(&self, name: &str, id: i64) {
        self.names.add_mapping(name, id);
    }

    /// Create a call target with the engine's default execution options.
    pub fn call_target(&self, root: RootNode) -> CallTarget {
        self.call_target_with(root, self.options.default_execution_options.clone())
    }

    pub fn call_target_with(&self, root: RootNode, options: ExecutionOptions) -> CallTarget {
        CallTarget::new(root, Arc::clone(&self.names), options)
    }

    /// Invoke `target`, converting failures to the public [`Error`].
    pub fn run(&self, target: &CallTarget, args: &[Value]) -> Result<Value, Error> {
        if !target.state().shares_names(&self.names) {
            return Err(Error::Api(format!(
                "Call target `{}` was created by a different engine",
                target.name()
            )));
        }
        Ok(target.invoke(args)?)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Expr;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_targets_share_mappings() {
        let engine = Engine::default();
        let first = engine.call_target(RootNode::expr("first", Expr::resolve("late")));
        let second = engine.call_target(RootNode::expr("second", Expr::resolve("late")));

        assert_eq!(engine.run(&first, &[]).unwrap(), Value::Undefined);
        engine.add_mapping("late", 5);
        assert_eq!(engine.run(&first, &[]).unwrap(), Value::Int(5));
        assert_eq!(engine.run(&second, &[]).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_foreign_target_is_rejected() {
        let engine = Engine::default();
        let other = Engine::default();
        let target = other.call_target(RootNode::expr("k", Expr::int(1)));
        assert!(matches!(engine.run(&target, &[]), Err(Error::Api(_))));
    }

    #[test]
    fn test_runtime_failure_is_converted() {
        let engine = Engine::default();
        let target = engine.call_target(RootNode::expr("a", Expr::arg(0)));
        assert_eq!(
            engine.run(&target, &[]),
            Err(Error::Runtime("Argument 0 out of bounds (0 arguments)".into()))
        );
    }

    #[test]
    fn test_cache_limit_option_applies() {
        let engine = Engine::new(EngineOptions {
            cache_limit: 4,
            ..EngineOptions::default()
        });
        assert_eq!(engine.names().cache_limit(), 4);
    }

    #[test]
    fn test_oversized_cache_limit_is_capped() {
        let engine = Engine::new(EngineOptions {
            cache_limit: 1000,
            ..EngineOptions::default()
        });
        assert_eq!(engine.names().cache_limit(), MAX_CHAIN_LIMIT);
        let target = engine.call_target(RootNode::expr("k", Expr::int(1)));
        assert_eq!(target.state().shapes().limit(), MAX_CHAIN_LIMIT);
        assert_eq!(target.state().name_cache().limit(), MAX_CHAIN_LIMIT);
    }
}
