//! Core evaluation logic.

use tracing::trace;

use crate::{
    api::ExecutionOptions,
    evaluator::{
        EvalResult, ExecutionErrorKind,
        ResourceExceededError::*,
        RuntimeError::{self, *},
    },
    frame::Frame,
    host::TargetState,
    nodes::{Expr, Flow, Stmt},
    specialize::eval_compare,
    values::Value,
};

/// One running invocation of a call target.
///
/// Holds everything that is private to the invocation (arguments, frame,
/// recursion depth) and borrows the call target's shared state, which is
/// where specialization decisions are published.
#[derive(Debug)]
pub struct Activation<'a> {
    target: &'a TargetState,
    args: &'a [Value],
    frame: Frame,
    depth: usize,
}

impl<'a> Activation<'a> {
    pub fn new(target: &'a TargetState, args: &'a [Value]) -> Self {
        let frame = Frame::new(target.descriptor());
        Self::resume(target, args, frame)
    }

    /// Continue an activation from a previously captured frame.
    pub fn resume(target: &'a TargetState, args: &'a [Value], frame: Frame) -> Self {
        Self {
            target,
            args,
            frame,
            depth: 0,
        }
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }

    pub fn options(&self) -> &ExecutionOptions {
        self.target.options()
    }

    pub(crate) fn enter_osr(&self) {
        self.target.stats().record_osr_entry();
    }

    fn enter(&mut self) -> EvalResult<()> {
        let max_depth = self.target.options().max_depth;
        if self.depth >= max_depth {
            return Err(StackOverflow {
                depth: self.depth,
                max_depth,
            }
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    /// Evaluate an expression node.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.enter()?;
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    /// Execute a statement node.
    pub fn execute(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        self.enter()?;
        let result = self.execute_inner(stmt);
        self.depth -= 1;
        result
    }

    /// Inner evaluation logic (no depth tracking).
    fn eval_inner(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Const(value) => Ok(value.clone()),

            Expr::Arg(index) => self.args.get(*index).cloned().ok_or_else(|| {
                ArgumentOutOfBounds {
                    index: *index,
                    len: self.args.len(),
                }
                .into()
            }),

            Expr::Read { slot, expect } => Ok(self.frame.read(*slot, *expect)?),

            Expr::Arith { site, left, right } => {
                // Left operand is evaluated fully before the right one.
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(site.evaluate(&left, &right, self.target.generation())?)
            }

            Expr::Compare { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(Value::Bool(eval_compare(*op, &left, &right)?))
            }

            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => match self.eval(cond)? {
                Value::Bool(true) => self.eval(then),
                Value::Bool(false) => self.eval(otherwise),
                other => Err(NotABoolean {
                    found: other.kind(),
                }
                .into()),
            },

            Expr::Resolve { name, site } => Ok(self
                .target
                .names()
                .resolve(self.target.name_cache(), site, name)
                .map_or(Value::Undefined, Value::Int)),

            Expr::Element { site, array, index } => {
                let array = match self.eval(array)? {
                    Value::Array(array) => array,
                    other => return Err(not_an_array(&other)),
                };
                let index = match self.eval(index)? {
                    Value::Int(index) => index,
                    other => {
                        return Err(NotAnIndex {
                            found: other.kind(),
                        }
                        .into());
                    }
                };
                site.get_element(self.target.shapes(), &array, index)
                    .ok_or_else(|| {
                        IndexOutOfBounds {
                            index,
                            len: array.len(),
                        }
                        .into()
                    })
            }

            Expr::Length(array) => match self.eval(array)? {
                Value::Array(array) => {
                    Ok(Value::Int(i64::try_from(array.len()).unwrap_or(i64::MAX)))
                }
                other => Err(not_an_array(&other)),
            },

            Expr::Format { template, arg } => {
                let arg = self.eval(arg)?;
                Ok(Value::str(&template.replacen("{}", &arg.to_string(), 1)))
            }

            Expr::Flag(flag) => Ok(Value::Bool(flag.get())),
        }
    }

    fn execute_inner(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::Block(stmts) => {
                for stmt in stmts {
                    if let flow @ Flow::Return(_) = self.execute(stmt)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Write { slot, value } => {
                let value = self.eval(value)?;
                trace!(slot, ?value, "frame write");
                self.frame.write(
                    self.target.descriptor(),
                    self.target.generation(),
                    *slot,
                    value,
                )?;
                Ok(Flow::Normal)
            }

            Stmt::Loop(lp) => lp.execute(self),

            Stmt::Return(value) => Ok(Flow::Return(self.eval(value)?)),

            Stmt::Eval(expr) => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
        }
    }
}

fn not_an_array(value: &Value) -> ExecutionErrorKind {
    RuntimeError::NotAnArray {
        found: value.kind(),
    }
    .into()
}
