//! Array-like values with heterogeneous backing representations.
//!
//! The two built-in shapes (a dense backing slice and an arithmetic integer
//! sequence) are enum variants so that element-access sites can dispatch to
//! them without an indirect call. User-defined shapes go through the
//! [`ArrayItems`] escape hatch.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::values::Value;

/// Capability implemented by user-defined array shapes.
pub trait ArrayItems: Send + Sync + fmt::Debug + 'static {
    /// Returns the item at `index`, or `None` if the shape checks bounds and
    /// `index` is out of range.
    fn get_item(&self, index: i64) -> Option<Value>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The concrete shape as `Any`; its type id keys element-access caches.
    fn as_any(&self) -> &dyn Any;
}

/// Arithmetic sequence `start, start + stride, ...` of `length` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerSequence {
    start: i64,
    length: usize,
    stride: i64,
}

impl IntegerSequence {
    pub fn new(start: i64, length: usize, stride: i64) -> Self {
        Self {
            start,
            length,
            stride,
        }
    }

    /// Item at `index`. Bounds are only asserted in debug builds; an
    /// out-of-range index in release builds extrapolates the sequence.
    pub fn get_item(&self, index: i64) -> i64 {
        debug_assert!(
            index >= 0 && (index as u64) < self.length as u64,
            "sequence index {} out of range (length {})",
            index,
            self.length
        );
        self.start.wrapping_add(index.wrapping_mul(self.stride))
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Identity of a concrete array shape, used as an inline-cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Dense,
    Sequence,
    Custom(TypeId),
}

/// Handle to an array-like value. Cloning is cheap.
#[derive(Clone)]
pub enum ArrayLike {
    Dense(Arc<[Value]>),
    Sequence(IntegerSequence),
    Custom(Arc<dyn ArrayItems>),
}

impl ArrayLike {
    pub fn dense(items: impl Into<Arc<[Value]>>) -> Self {
        ArrayLike::Dense(items.into())
    }

    pub fn sequence(start: i64, length: usize, stride: i64) -> Self {
        ArrayLike::Sequence(IntegerSequence::new(start, length, stride))
    }

    pub fn custom(items: impl ArrayItems) -> Self {
        ArrayLike::Custom(Arc::new(items))
    }

    pub fn shape(&self) -> ShapeId {
        match self {
            ArrayLike::Dense(_) => ShapeId::Dense,
            ArrayLike::Sequence(_) => ShapeId::Sequence,
            ArrayLike::Custom(items) => ShapeId::Custom(items.as_any().type_id()),
        }
    }

    /// Generic, always-dispatching item access.
    pub fn get_item(&self, index: i64) -> Option<Value> {
        match self {
            ArrayLike::Dense(items) => usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned(),
            ArrayLike::Sequence(seq) => Some(Value::Int(seq.get_item(index))),
            ArrayLike::Custom(items) => items.get_item(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayLike::Dense(items) => items.len(),
            ArrayLike::Sequence(seq) => seq.len(),
            ArrayLike::Custom(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity comparison: two handles are equal if they share the same
    /// backing storage (sequences compare by their parameters).
    pub fn ptr_eq(&self, other: &ArrayLike) -> bool {
        match (self, other) {
            (ArrayLike::Dense(a), ArrayLike::Dense(b)) => Arc::ptr_eq(a, b),
            (ArrayLike::Sequence(a), ArrayLike::Sequence(b)) => a == b,
            (ArrayLike::Custom(a), ArrayLike::Custom(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ArrayLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLike::Dense(items) => f.debug_tuple("Dense").field(&items.len()).finish(),
            ArrayLike::Sequence(seq) => fmt::Debug::fmt(seq, f),
            ArrayLike::Custom(items) => f.debug_tuple("Custom").field(items).finish(),
        }
    }
}

impl From<Vec<Value>> for ArrayLike {
    fn from(items: Vec<Value>) -> Self {
        ArrayLike::Dense(items.into())
    }
}

impl From<IntegerSequence> for ArrayLike {
    fn from(seq: IntegerSequence) -> Self {
        ArrayLike::Sequence(seq)
    }
}
