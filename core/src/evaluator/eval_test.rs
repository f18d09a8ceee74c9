//! Unit tests for the evaluator.

use std::sync::Arc;

use super::*;
use crate::{
    api::ExecutionOptions,
    cache::NameRegistry,
    casting::ReadKind,
    frame::SlotKind,
    host::{CallTarget, StableFlag},
    nodes::{Expr, Flow, LoopState, RootNode, Stmt},
    values::{ArrayLike, Value, ValueKind},
};
use pretty_assertions::assert_eq;

struct Runner {
    names: Arc<NameRegistry>,
    options: ExecutionOptions,
}

impl Runner {
    fn new() -> Self {
        Self {
            names: Arc::new(NameRegistry::new(2)),
            options: ExecutionOptions::default(),
        }
    }

    fn with_options(options: ExecutionOptions) -> Self {
        Self {
            options,
            ..Self::new()
        }
    }

    fn target(&self, root: RootNode) -> CallTarget {
        CallTarget::new(root, Arc::clone(&self.names), self.options.clone())
    }

    fn eval(&self, expr: Expr, args: &[Value]) -> Result<Value, ExecutionError> {
        self.target(RootNode::expr("test", expr)).invoke(args)
    }

    fn exec(&self, frame_size: usize, stmt: Stmt, args: &[Value]) -> Result<Value, ExecutionError> {
        self.target(RootNode::stmt("test", frame_size, stmt)).invoke(args)
    }
}

fn runtime_error(result: Result<Value, ExecutionError>) -> RuntimeError {
    match result {
        Err(ExecutionError {
            kind: ExecutionErrorKind::Runtime(e),
            ..
        }) => e,
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn test_constants_and_arguments() {
    let runner = Runner::new();
    assert_eq!(runner.eval(Expr::int(42), &[]).unwrap(), Value::Int(42));
    assert_eq!(
        runner.eval(Expr::arg(1), &[Value::Int(1), Value::str("b")]).unwrap(),
        Value::str("b")
    );
}

#[test]
fn test_argument_out_of_range_is_fatal() {
    let runner = Runner::new();
    assert_eq!(
        runtime_error(runner.eval(Expr::arg(3), &[Value::Int(1)])),
        RuntimeError::ArgumentOutOfBounds { index: 3, len: 1 }
    );
}

#[test]
fn test_nested_plus_widens_to_float() {
    let runner = Runner::new();
    let pi = std::f64::consts::PI;
    let expr = Expr::add(Expr::arg(0), Expr::add(Expr::arg(2), Expr::arg(1)));
    let args = [Value::Int(5), Value::Float(pi), Value::Int(11), Value::Int(15)];
    assert_eq!(runner.eval(expr, &args).unwrap(), Value::Float(16.0 + pi));
}

#[test]
fn test_integer_overflow_wraps() {
    let runner = Runner::new();
    let expr = Expr::add(Expr::int(i64::MAX), Expr::int(1));
    assert_eq!(runner.eval(expr, &[]).unwrap(), Value::Int(i64::MIN));
}

#[test]
fn test_undefined_propagates_through_arithmetic() {
    let runner = Runner::new();
    let expr = Expr::mul(Expr::add(Expr::arg(0), Expr::int(1)), Expr::int(2));
    assert_eq!(runner.eval(expr, &[Value::Undefined]).unwrap(), Value::Undefined);
}

#[test]
fn test_unsupported_operands() {
    let runner = Runner::new();
    let expr = Expr::add(Expr::arg(0), Expr::int(1));
    assert_eq!(
        runtime_error(runner.eval(expr, &[Value::Bool(true)])),
        RuntimeError::UnsupportedOperands {
            op: "+",
            left: ValueKind::Bool,
            right: ValueKind::Int,
        }
    );
}

#[test]
fn test_conditional_runs_one_branch() {
    let runner = Runner::new();
    // The untaken branch would fail if it ran.
    let expr = Expr::conditional(Expr::lt(Expr::arg(0), Expr::int(10)), Expr::int(1), Expr::arg(9));
    assert_eq!(runner.eval(expr, &[Value::Int(3)]).unwrap(), Value::Int(1));
}

#[test]
fn test_conditional_requires_bool() {
    let runner = Runner::new();
    let expr = Expr::conditional(Expr::int(1), Expr::int(1), Expr::int(2));
    assert_eq!(
        runtime_error(runner.eval(expr, &[])),
        RuntimeError::NotABoolean {
            found: ValueKind::Int
        }
    );
}

#[test]
fn test_element_access() {
    let runner = Runner::new();
    let seq = Value::Array(ArrayLike::sequence(1, 10, 1));
    let expr = Expr::element(Expr::arg(0), Expr::arg(1));
    let target = runner.target(RootNode::expr("get", expr));
    assert_eq!(target.invoke(&[seq.clone(), Value::Int(0)]).unwrap(), Value::Int(1));
    assert_eq!(target.invoke(&[seq, Value::Int(9)]).unwrap(), Value::Int(10));
}

#[test]
fn test_element_errors() {
    let runner = Runner::new();
    let dense = Value::Array(ArrayLike::dense(vec![Value::Int(1)]));
    let expr = || Expr::element(Expr::arg(0), Expr::arg(1));

    assert_eq!(
        runtime_error(runner.eval(expr(), &[dense.clone(), Value::Int(4)])),
        RuntimeError::IndexOutOfBounds { index: 4, len: 1 }
    );
    assert_eq!(
        runtime_error(runner.eval(expr(), &[dense, Value::Float(0.0)])),
        RuntimeError::NotAnIndex {
            found: ValueKind::Float
        }
    );
    assert_eq!(
        runtime_error(runner.eval(expr(), &[Value::Int(1), Value::Int(0)])),
        RuntimeError::NotAnArray {
            found: ValueKind::Int
        }
    );
}

#[test]
fn test_length_and_format() {
    let runner = Runner::new();
    let expr = Expr::format("len={}", Expr::length(Expr::arg(0)));
    let arg = Value::Array(ArrayLike::sequence(0, 7, 2));
    assert_eq!(runner.eval(expr, &[arg]).unwrap(), Value::str("len=7"));
}

#[test]
fn test_resolve_unknown_name_is_undefined() {
    let runner = Runner::new();
    runner.names.add_mapping("kuk", 66);
    let target = runner.target(RootNode::expr("buk", Expr::resolve("buk")));
    for _ in 0..3 {
        assert_eq!(target.invoke(&[]).unwrap(), Value::Undefined);
    }
}

#[test]
fn test_flag_reads_false_until_set() {
    let runner = Runner::new();
    let flag = Arc::new(StableFlag::new("loud"));
    let target = runner.target(RootNode::expr("flag", Expr::flag(Arc::clone(&flag))));
    assert_eq!(target.invoke(&[]).unwrap(), Value::Bool(false));
    flag.set(true);
    assert_eq!(target.invoke(&[]).unwrap(), Value::Bool(true));
}

#[test]
fn test_block_stops_at_return() {
    let runner = Runner::new();
    let stmt = Stmt::block([
        Stmt::write(0, Expr::int(1)),
        Stmt::ret(Expr::read(0)),
        Stmt::write(0, Expr::arg(5)),
    ]);
    assert_eq!(runner.exec(1, stmt, &[]).unwrap(), Value::Int(1));
}

#[test]
fn test_return_unwinds_out_of_loop() {
    let runner = Runner::new();
    // while true { a = a + 1; if-return when a reaches 3 }
    let stmt = Stmt::block([
        Stmt::write(0, Expr::int(0)),
        Stmt::while_loop(
            Expr::Const(Value::Bool(true)),
            Stmt::block([
                Stmt::write(0, Expr::add(Expr::read(0), Expr::int(1))),
                Stmt::while_loop(
                    Expr::compare(crate::specialize::CompareOp::Eq, Expr::read(0), Expr::int(3)),
                    Stmt::ret(Expr::read(0)),
                ),
            ]),
        ),
        Stmt::ret(Expr::int(-1)),
    ]);
    assert_eq!(runner.exec(1, stmt, &[]).unwrap(), Value::Int(3));
}

#[test]
fn test_uninitialized_read_is_fatal() {
    let runner = Runner::new();
    let stmt = Stmt::ret(Expr::read(0));
    assert_eq!(
        runtime_error(runner.exec(1, stmt, &[])),
        RuntimeError::UninitializedRead { slot: 0 }
    );
}

#[test]
fn test_read_expectation_mismatch() {
    let runner = Runner::new();
    let stmt = Stmt::block([
        Stmt::write(0, Expr::Const(Value::str("x"))),
        Stmt::ret(Expr::read_as(0, ReadKind::Float)),
    ]);
    assert_eq!(
        runtime_error(runner.exec(1, stmt, &[])),
        RuntimeError::TypeMismatch {
            slot: 0,
            expected: ReadKind::Float,
            found: ValueKind::Str,
        }
    );
}

#[test]
fn test_slot_promotion_sticks_across_invocations() {
    let runner = Runner::new();
    let stmt = Stmt::block([
        Stmt::write(0, Expr::arg(0)),
        Stmt::ret(Expr::read(0)),
    ]);
    let target = runner.target(RootNode::stmt("slot", 1, stmt));

    assert_eq!(target.invoke(&[Value::Int(1)]).unwrap(), Value::Int(1));
    assert_eq!(target.frame_descriptor().kind(0), Some(SlotKind::Int));

    assert_eq!(target.invoke(&[Value::str("x")]).unwrap(), Value::str("x"));
    assert_eq!(target.frame_descriptor().kind(0), Some(SlotKind::Generic));

    assert_eq!(target.invoke(&[Value::Int(2)]).unwrap(), Value::Int(2));
    assert_eq!(target.frame_descriptor().kind(0), Some(SlotKind::Generic));
}

#[test]
fn test_stack_overflow() {
    let runner = Runner::with_options(ExecutionOptions {
        max_depth: 10,
        ..ExecutionOptions::default()
    });
    let expr = (0..20).fold(Expr::int(0), |acc, _| Expr::add(acc, Expr::int(1)));
    let result = runner.eval(expr, &[]);
    assert!(matches!(
        result,
        Err(ExecutionError {
            kind: ExecutionErrorKind::ResourceExceeded(ResourceExceededError::StackOverflow {
                max_depth: 10,
                ..
            }),
            ..
        })
    ));
}

#[test]
fn test_loop_returns_bound() {
    let runner = Runner::new();
    for bound in [0, 1, 10, 1000] {
        let target = runner.target(crate::programs::count_to(bound, 1));
        assert_eq!(target.invoke(&[]).unwrap(), Value::Int(bound));
    }
}

#[test]
fn test_loop_enters_osr_past_threshold() {
    let runner = Runner::with_options(ExecutionOptions {
        osr_threshold: 100,
        ..ExecutionOptions::default()
    });
    let short = runner.target(crate::programs::count_to(50, 1));
    assert_eq!(short.invoke(&[]).unwrap(), Value::Int(50));
    assert_eq!(short.stats().osr_entries(), 0);

    let long = runner.target(crate::programs::count_to(500, 1));
    assert_eq!(long.invoke(&[]).unwrap(), Value::Int(500));
    assert_eq!(long.stats().osr_entries(), 1);
}

#[test]
fn test_loop_resumes_from_captured_frame() {
    let runner = Runner::new();
    let init = Stmt::write(0, Expr::int(0));
    let lp = crate::nodes::Loop::new(crate::nodes::WhileBody::new(
        Expr::lt(Expr::read(0), Expr::int(20)),
        Stmt::write(0, Expr::add(Expr::read(0), Expr::int(2))),
    ));
    let target = runner.target(RootNode::stmt("split", 1, Stmt::block([])));

    let mut first = target.activation(&[]);
    assert_eq!(first.execute(&init).unwrap(), Flow::Normal);
    assert_eq!(lp.run(&mut first, Some(4)).unwrap(), LoopState::Running);
    let frame = first.into_frame();
    assert_eq!(frame.read(0, ReadKind::Any), Ok(Value::Int(8)));

    let mut resumed = target.resume(&[], frame);
    assert_eq!(
        lp.run(&mut resumed, None).unwrap(),
        LoopState::Done(Flow::Normal)
    );
    assert_eq!(resumed.frame().read(0, ReadKind::Any), Ok(Value::Int(20)));
}
