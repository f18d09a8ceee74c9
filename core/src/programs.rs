//! Hand-built graphs used by tests, benches and the facade crate.

use std::sync::Arc;

use crate::{
    evaluator::RuntimeError,
    host::StableFlag,
    nodes::{Expr, RootNode, Stmt},
    specialize::{ArithOp, eval_arith_generic},
    values::{ArrayLike, Value},
};

/// `a0 + (a2 + a1)`.
pub fn sum_chain() -> RootNode {
    RootNode::expr(
        "sum_chain",
        Expr::add(Expr::arg(0), Expr::add(Expr::arg(2), Expr::arg(1))),
    )
}

/// ```text
/// a = 0
/// while a < bound { a = a + step }
/// return a
/// ```
pub fn count_to(bound: i64, step: i64) -> RootNode {
    const A: usize = 0;
    RootNode::stmt(
        "count_to",
        1,
        Stmt::block([
            Stmt::write(A, Expr::int(0)),
            Stmt::while_loop(
                Expr::lt(Expr::read(A), Expr::int(bound)),
                Stmt::write(A, Expr::add(Expr::read(A), Expr::int(step))),
            ),
            Stmt::ret(Expr::read(A)),
        ]),
    )
}

/// Sum of `item * factor` over the array in `a0`.
pub fn mul_and_sum(factor: i64) -> RootNode {
    const I: usize = 0;
    const SUM: usize = 1;
    RootNode::stmt(
        "mul_and_sum",
        2,
        Stmt::block([
            Stmt::write(SUM, Expr::int(0)),
            Stmt::write(I, Expr::int(0)),
            Stmt::while_loop(
                Expr::lt(Expr::read(I), Expr::length(Expr::arg(0))),
                Stmt::block([
                    Stmt::write(
                        SUM,
                        Expr::add(
                            Expr::read(SUM),
                            Expr::mul(Expr::element(Expr::arg(0), Expr::read(I)), Expr::int(factor)),
                        ),
                    ),
                    Stmt::write(I, Expr::add(Expr::read(I), Expr::int(1))),
                ]),
            ),
            Stmt::ret(Expr::read(SUM)),
        ]),
    )
}

/// What [`mul_and_sum`] computes, without the graph.
pub fn mul_and_sum_native(items: &ArrayLike, factor: i64) -> Result<Value, RuntimeError> {
    let factor = Value::Int(factor);
    (0..items.len() as i64).try_fold(Value::Int(0), |sum, i| {
        let item = items.get_item(i).unwrap_or(Value::Undefined);
        let product = eval_arith_generic(ArithOp::Mul, &item, &factor)?;
        eval_arith_generic(ArithOp::Add, &sum, &product)
    })
}

/// Resolves `name` through the engine's registry.
pub fn lookup(name: &str) -> RootNode {
    RootNode::expr("lookup", Expr::resolve(name))
}

/// Greets `a0`, warmly once `warm` has been requested.
///
/// Call targets built from this root should depend on
/// `warm.assumption()` so that flipping the flag deoptimizes them.
pub fn greeter(warm: Arc<StableFlag>) -> RootNode {
    RootNode::expr(
        "greeter",
        Expr::conditional(
            Expr::flag(warm),
            Expr::format("Very nice ahoj from {}!", Expr::arg(0)),
            Expr::format("Hello from {}!", Expr::arg(0)),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Engine, EngineOptions, ExecutionOptions};
    use crate::test_utils::init_test_logging;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sum_chain() {
        let engine = Engine::default();
        let target = engine.call_target(sum_chain());
        let args = [
            Value::Int(5),
            Value::Float(std::f64::consts::PI),
            Value::Int(11),
            Value::Int(15),
        ];
        assert_eq!(
            target.invoke(&args).unwrap(),
            Value::Float(16.0 + std::f64::consts::PI)
        );
    }

    #[test]
    fn test_count_to_returns_bound() {
        let engine = Engine::default();
        let target = engine.call_target(count_to(1000, 1));
        assert_eq!(target.invoke(&[]).unwrap(), Value::Int(1000));

        let target = engine.call_target(count_to(0, 1));
        assert_eq!(target.invoke(&[]).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_mul_and_sum_matches_native() {
        let engine = Engine::default();
        let target = engine.call_target(mul_and_sum(3));
        for array in [
            ArrayLike::sequence(1, 10, 1),
            ArrayLike::dense(vec![Value::Int(2), Value::Float(0.5), Value::Int(-1)]),
            ArrayLike::dense(Vec::new()),
        ] {
            let expected = mul_and_sum_native(&array, 3).unwrap();
            assert_eq!(target.invoke(&[Value::Array(array)]).unwrap(), expected);
        }
    }

    #[test]
    fn test_mul_and_sum_of_sequence() {
        assert_eq!(
            mul_and_sum_native(&ArrayLike::sequence(1, 10, 1), 2),
            Ok(Value::Int(110))
        );
    }

    #[test]
    fn test_greeter_follows_flag() {
        init_test_logging();
        let engine = Engine::new(EngineOptions {
            default_execution_options: ExecutionOptions {
                compile_threshold: 2,
                ..ExecutionOptions::default()
            },
            ..EngineOptions::default()
        });
        let warm = Arc::new(StableFlag::new("warm"));
        let target = engine
            .call_target(greeter(Arc::clone(&warm)))
            .depend_on(Arc::clone(warm.assumption()));
        let who = [Value::str("Prague")];

        for _ in 0..3 {
            assert_eq!(target.invoke(&who).unwrap(), Value::str("Hello from Prague!"));
        }
        assert_eq!(target.stats().compilations(), 1);

        warm.set(true);
        assert_eq!(
            target.invoke(&who).unwrap(),
            Value::str("Very nice ahoj from Prague!")
        );
        assert_eq!(target.stats().deoptimizations(), 1);
    }
}
