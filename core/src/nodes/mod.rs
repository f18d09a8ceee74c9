//! The node graph.
//!
//! A call target's body is an immutable tree of [`Expr`] and [`Stmt`] nodes.
//! The tree shape never changes after construction; what adapts at run time
//! is the state each node owns: the [`ArithSite`] of an arithmetic node, the
//! inline cache head of a name or element lookup. All of that state is
//! interior and atomic, so one graph can serve many activations at once.
//!
//! Evaluation lives in [`crate::evaluator`]; this module only describes the
//! graph and offers builder helpers for constructing it by hand.

mod control;

pub use control::{Loop, LoopState, RepeatingBody, Step, WhileBody};

use std::sync::Arc;

use crate::{
    cache::{ElementSite, NameSite},
    casting::ReadKind,
    evaluator::{Activation, EvalResult},
    host::StableFlag,
    specialize::{ArithOp, ArithSite, CompareOp},
    values::Value,
};

/// Completion of a statement.
///
/// `Return` unwinds through every enclosing statement until the root turns
/// it into the activation's result.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Expression nodes.
#[derive(Debug)]
pub enum Expr {
    Const(Value),

    /// Argument at a fixed position.
    Arg(usize),

    /// Frame slot read, coerced to what the reader expects.
    Read { slot: usize, expect: ReadKind },

    Arith {
        site: ArithSite,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Evaluates `cond`, then exactly one branch.
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    /// Name to id through the site's cache. Unknown names yield `Undefined`.
    Resolve { name: Arc<str>, site: NameSite },

    Element {
        site: ElementSite,
        array: Box<Expr>,
        index: Box<Expr>,
    },

    Length(Box<Expr>),

    /// Replaces the `{}` in `template` with the argument's display form.
    Format { template: Arc<str>, arg: Box<Expr> },

    Flag(Arc<StableFlag>),
}

impl Expr {
    pub fn evaluate(&self, activation: &mut Activation<'_>) -> EvalResult<Value> {
        activation.eval(self)
    }

    pub fn int(value: i64) -> Expr {
        Expr::Const(Value::Int(value))
    }

    pub fn float(value: f64) -> Expr {
        Expr::Const(Value::Float(value))
    }

    pub fn undefined() -> Expr {
        Expr::Const(Value::Undefined)
    }

    pub fn arg(index: usize) -> Expr {
        Expr::Arg(index)
    }

    pub fn read(slot: usize) -> Expr {
        Expr::read_as(slot, ReadKind::Any)
    }

    pub fn read_as(slot: usize, expect: ReadKind) -> Expr {
        Expr::Read { slot, expect }
    }

    pub fn arith(op: ArithOp, left: Expr, right: Expr) -> Expr {
        Expr::Arith {
            site: ArithSite::new(op),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(left: Expr, right: Expr) -> Expr {
        Expr::arith(ArithOp::Add, left, right)
    }

    pub fn sub(left: Expr, right: Expr) -> Expr {
        Expr::arith(ArithOp::Sub, left, right)
    }

    pub fn mul(left: Expr, right: Expr) -> Expr {
        Expr::arith(ArithOp::Mul, left, right)
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn lt(left: Expr, right: Expr) -> Expr {
        Expr::compare(CompareOp::Lt, left, right)
    }

    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn resolve(name: &str) -> Expr {
        Expr::Resolve {
            name: Arc::from(name),
            site: NameSite::new(),
        }
    }

    pub fn element(array: Expr, index: Expr) -> Expr {
        Expr::Element {
            site: ElementSite::new(),
            array: Box::new(array),
            index: Box::new(index),
        }
    }

    pub fn length(array: Expr) -> Expr {
        Expr::Length(Box::new(array))
    }

    pub fn format(template: &str, arg: Expr) -> Expr {
        Expr::Format {
            template: Arc::from(template),
            arg: Box::new(arg),
        }
    }

    pub fn flag(flag: Arc<StableFlag>) -> Expr {
        Expr::Flag(flag)
    }
}

/// Statement nodes.
#[derive(Debug)]
pub enum Stmt {
    /// Runs statements left to right, stopping at the first `Return`.
    Block(Vec<Stmt>),
    Write { slot: usize, value: Expr },
    Loop(Loop),
    Return(Expr),
    /// Evaluates for effect; the value is dropped.
    Eval(Expr),
}

impl Stmt {
    pub fn execute(&self, activation: &mut Activation<'_>) -> EvalResult<Flow> {
        activation.execute(self)
    }

    pub fn block(stmts: impl IntoIterator<Item = Stmt>) -> Stmt {
        Stmt::Block(stmts.into_iter().collect())
    }

    pub fn write(slot: usize, value: Expr) -> Stmt {
        Stmt::Write { slot, value }
    }

    pub fn while_loop(cond: Expr, body: Stmt) -> Stmt {
        Stmt::Loop(Loop::new(WhileBody::new(cond, body)))
    }

    pub fn ret(value: Expr) -> Stmt {
        Stmt::Return(value)
    }
}

/// Body of a call target.
#[derive(Debug)]
pub enum Body {
    Expr(Expr),
    Stmt(Stmt),
}

/// The entry node of a call target.
#[derive(Debug)]
pub struct RootNode {
    name: String,
    frame_size: usize,
    body: Body,
}

impl RootNode {
    pub fn new(name: impl Into<String>, frame_size: usize, body: Body) -> Self {
        Self {
            name: name.into(),
            frame_size,
            body,
        }
    }

    /// A root evaluating one expression, with no locals.
    pub fn expr(name: impl Into<String>, expr: Expr) -> Self {
        Self::new(name, 0, Body::Expr(expr))
    }

    pub fn stmt(name: impl Into<String>, frame_size: usize, stmt: Stmt) -> Self {
        Self::new(name, frame_size, Body::Stmt(stmt))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Run the body. A statement body that completes normally yields
    /// `Undefined`.
    pub fn execute(&self, activation: &mut Activation<'_>) -> EvalResult<Value> {
        match &self.body {
            Body::Expr(expr) => activation.eval(expr),
            Body::Stmt(stmt) => match activation.execute(stmt)? {
                Flow::Return(value) => Ok(value),
                Flow::Normal => Ok(Value::Undefined),
            },
        }
    }
}
