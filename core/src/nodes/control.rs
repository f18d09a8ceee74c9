//! Loops and the on-stack-replacement boundary.
//!
//! A loop keeps no state of its own: everything an iteration needs lives in
//! the activation's frame. That makes every iteration boundary a safe point
//! at which the host can stop interpreting and resume the same loop later
//! from the same frame.

use tracing::trace;

use crate::{
    evaluator::{Activation, EvalResult, RuntimeError},
    nodes::{Expr, Flow, Stmt},
    values::Value,
};

/// Outcome of one loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Run another iteration.
    Again,
    /// The loop is over, either normally or through a `Return`.
    Done(Flow),
}

/// One repeatable unit: re-check the guard, then run the body.
pub trait RepeatingBody: std::fmt::Debug + Send + Sync {
    fn step(&self, activation: &mut Activation<'_>) -> EvalResult<Step>;
}

/// `while cond { body }`.
#[derive(Debug)]
pub struct WhileBody {
    cond: Expr,
    body: Box<Stmt>,
}

impl WhileBody {
    pub fn new(cond: Expr, body: Stmt) -> Self {
        Self {
            cond,
            body: Box::new(body),
        }
    }
}

impl RepeatingBody for WhileBody {
    fn step(&self, activation: &mut Activation<'_>) -> EvalResult<Step> {
        match activation.eval(&self.cond)? {
            Value::Bool(false) => Ok(Step::Done(Flow::Normal)),
            Value::Bool(true) => match activation.execute(&self.body)? {
                Flow::Normal => Ok(Step::Again),
                flow @ Flow::Return(_) => Ok(Step::Done(flow)),
            },
            other => Err(RuntimeError::NotABoolean {
                found: other.kind(),
            }
            .into()),
        }
    }
}

/// Where a loop stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    /// The iteration budget ran out at an iteration boundary.
    Running,
    Done(Flow),
}

#[derive(Debug)]
pub struct Loop {
    body: Box<dyn RepeatingBody>,
}

impl Loop {
    pub fn new(body: impl RepeatingBody + 'static) -> Self {
        Self {
            body: Box::new(body),
        }
    }

    /// Step the body until it finishes or `budget` iterations have run.
    ///
    /// `None` means no budget. Calling `run` again with the same activation
    /// continues exactly where the previous call stopped.
    pub fn run(&self, activation: &mut Activation<'_>, budget: Option<u64>) -> EvalResult<LoopState> {
        let mut iterations = 0u64;
        loop {
            if budget.is_some_and(|limit| iterations >= limit) {
                return Ok(LoopState::Running);
            }
            match self.body.step(activation)? {
                Step::Again => iterations += 1,
                Step::Done(flow) => return Ok(LoopState::Done(flow)),
            }
        }
    }

    /// Interpret up to the OSR threshold, then hand the live frame to the
    /// unbounded tier.
    pub fn execute(&self, activation: &mut Activation<'_>) -> EvalResult<Flow> {
        let mut budget = Some(activation.options().osr_threshold);
        loop {
            match self.run(activation, budget)? {
                LoopState::Done(flow) => return Ok(flow),
                LoopState::Running => {
                    trace!(threshold = ?budget, "loop reached OSR threshold");
                    activation.enter_osr();
                    budget = None;
                }
            }
        }
    }
}
