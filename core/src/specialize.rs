//! Type-specialized arithmetic.
//!
//! Every arithmetic node owns an [`ArithSite`] that evaluates through an
//! ordered table of type-guarded variants, narrowest first:
//!
//! 1. `(Int, Int) -> Int` (wrapping)
//! 2. `(Float, Float) -> Float`, with `Int` operands widened
//! 3. `(Undefined, _) -> Undefined`
//! 4. `(_, Undefined) -> Undefined`
//!
//! Anything else is `UnsupportedOperands`. The site remembers which variants
//! it has observed; a site that has only ever seen integers takes the integer
//! path before consulting the table. Observing a new variant bumps the call
//! target's code generation, since compiled code specialized to the old set
//! no longer covers the site.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use tracing::trace;

use crate::{
    evaluator::{
        RuntimeError,
        operators::{eval_binary_float, eval_binary_int, eval_comparison_float, eval_comparison_int},
    },
    host::CodeGeneration,
    values::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
        }
    }
}

/// One row of the variant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Int,
    Float,
    UndefinedLeft,
    UndefinedRight,
}

bitflags! {
    /// Set of variants a site has observed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Variants: u8 {
        const INT = 1;
        const FLOAT = 1 << 1;
        const UNDEFINED_LEFT = 1 << 2;
        const UNDEFINED_RIGHT = 1 << 3;
    }
}

impl Variant {
    /// Select the first variant accepting `(left, right)`, top to bottom.
    pub fn select(left: &Value, right: &Value) -> Option<Variant> {
        match (left, right) {
            (Value::Int(_), Value::Int(_)) => Some(Variant::Int),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                Some(Variant::Float)
            }
            (Value::Undefined, _) => Some(Variant::UndefinedLeft),
            (_, Value::Undefined) => Some(Variant::UndefinedRight),
            _ => None,
        }
    }

    pub fn flag(self) -> Variants {
        match self {
            Variant::Int => Variants::INT,
            Variant::Float => Variants::FLOAT,
            Variant::UndefinedLeft => Variants::UNDEFINED_LEFT,
            Variant::UndefinedRight => Variants::UNDEFINED_RIGHT,
        }
    }

    /// Run this variant. The operands must be accepted by it.
    fn apply(self, op: ArithOp, left: &Value, right: &Value) -> Value {
        match (self, left, right) {
            (Variant::Int, Value::Int(l), Value::Int(r)) => Value::Int(eval_binary_int(op, *l, *r)),
            (Variant::Float, _, _) => match (left.as_float(), right.as_float()) {
                (Some(l), Some(r)) => Value::Float(eval_binary_float(op, l, r)),
                _ => Value::Undefined,
            },
            _ => Value::Undefined,
        }
    }
}

/// The unspecialized path: always walks the table from the top.
pub fn eval_arith_generic(op: ArithOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match Variant::select(left, right) {
        Some(variant) => Ok(variant.apply(op, left, right)),
        None => Err(unsupported(op.symbol(), left, right)),
    }
}

/// Numeric comparison with `Int -> Float` widening. `Eq` is total.
pub fn eval_compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => Ok(eval_comparison_int(op, *l, *r)),
        _ => match (left.as_float(), right.as_float()) {
            (Some(l), Some(r)) => Ok(eval_comparison_float(op, l, r)),
            _ if op == CompareOp::Eq => Ok(left == right),
            _ => Err(unsupported(op.symbol(), left, right)),
        },
    }
}

fn unsupported(op: &'static str, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::UnsupportedOperands {
        op,
        left: left.kind(),
        right: right.kind(),
    }
}

/// Specialization state of one arithmetic node.
#[derive(Debug)]
pub struct ArithSite {
    op: ArithOp,
    seen: AtomicU8,
}

impl ArithSite {
    pub fn new(op: ArithOp) -> Self {
        Self {
            op,
            seen: AtomicU8::new(0),
        }
    }

    pub fn op(&self) -> ArithOp {
        self.op
    }

    pub fn seen(&self) -> Variants {
        Variants::from_bits_truncate(self.seen.load(Ordering::Acquire))
    }

    pub fn evaluate(
        &self,
        left: &Value,
        right: &Value,
        generation: &CodeGeneration,
    ) -> Result<Value, RuntimeError> {
        if self.seen() == Variants::INT {
            if let (Value::Int(l), Value::Int(r)) = (left, right) {
                return Ok(Value::Int(eval_binary_int(self.op, *l, *r)));
            }
        }

        let Some(variant) = Variant::select(left, right) else {
            return Err(unsupported(self.op.symbol(), left, right));
        };
        self.observe(variant, generation);
        Ok(variant.apply(self.op, left, right))
    }

    fn observe(&self, variant: Variant, generation: &CodeGeneration) {
        let bit = variant.flag().bits();
        let prev = self.seen.fetch_or(bit, Ordering::AcqRel);
        if prev & bit == 0 {
            trace!(op = %self.op, ?variant, "arithmetic site widened");
            generation.invalidate("arithmetic specialization widened");
        }
    }
}
