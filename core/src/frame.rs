//! Frame-local variable storage.
//!
//! A [`FrameDescriptor`] belongs to a call target and records, per slot, the
//! representation chosen for it: `Uninitialized` until the first write, then
//! `Int` (unboxed) if that write stored an integer, else `Generic`. Kinds only
//! ever widen (`Uninitialized -> Int -> Generic`), and every decision bumps
//! the call target's code generation.
//!
//! A [`Frame`] is the per-activation storage. Each stored slot carries its own
//! tag, so an activation that raced with a promotion still reads back exactly
//! what it wrote.

use std::sync::atomic::{AtomicU8, Ordering};

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    casting::{self, CastError, ReadKind},
    evaluator::RuntimeError,
    host::CodeGeneration,
    values::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SlotKind {
    Uninitialized = 0,
    Int = 1,
    Generic = 2,
}

impl SlotKind {
    fn from_u8(raw: u8) -> SlotKind {
        match raw {
            0 => SlotKind::Uninitialized,
            1 => SlotKind::Int,
            _ => SlotKind::Generic,
        }
    }

    fn for_value(value: &Value) -> SlotKind {
        match value {
            Value::Int(_) => SlotKind::Int,
            _ => SlotKind::Generic,
        }
    }
}

/// Per-call-target slot layout and kinds.
#[derive(Debug)]
pub struct FrameDescriptor {
    kinds: Box<[AtomicU8]>,
}

impl FrameDescriptor {
    pub fn new(size: usize) -> Self {
        Self {
            kinds: (0..size).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.kinds.len()
    }

    pub fn kind(&self, slot: usize) -> Option<SlotKind> {
        self.kinds
            .get(slot)
            .map(|k| SlotKind::from_u8(k.load(Ordering::Acquire)))
    }

    /// Widen `slot` to at least `wanted`. Returns the kind now in effect,
    /// which may be wider than `wanted` if another activation got there first.
    fn widen(&self, slot: usize, wanted: SlotKind, generation: &CodeGeneration) -> SlotKind {
        let Some(cell) = self.kinds.get(slot) else {
            return SlotKind::Generic;
        };
        let result = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
            (SlotKind::from_u8(raw) < wanted).then_some(wanted as u8)
        });
        match result {
            Ok(previous) => {
                debug!(
                    slot,
                    from = ?SlotKind::from_u8(previous),
                    to = ?wanted,
                    "frame slot kind changed"
                );
                generation.invalidate("frame slot kind changed");
                wanted
            }
            Err(current) => SlotKind::from_u8(current),
        }
    }
}

/// Storage of one slot in one activation.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Empty,
    Int(i64),
    Boxed(Value),
}

/// Local variables of one activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    slots: SmallVec<[Slot; 8]>,
}

impl Frame {
    pub fn new(descriptor: &FrameDescriptor) -> Self {
        Self::with_size(descriptor.size())
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| Slot::Empty).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot: usize) -> Option<&Slot> {
        self.slots.get(slot)
    }

    /// Store `value`, deciding or promoting the slot kind as needed.
    pub fn write(
        &mut self,
        descriptor: &FrameDescriptor,
        generation: &CodeGeneration,
        slot: usize,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let size = self.slots.len();
        let (Some(target), Some(kind)) = (self.slots.get_mut(slot), descriptor.kind(slot)) else {
            return Err(RuntimeError::SlotOutOfBounds { slot, size });
        };

        let wanted = SlotKind::for_value(&value);
        let kind = if kind < wanted {
            descriptor.widen(slot, wanted, generation)
        } else {
            kind
        };

        *target = match (kind, value) {
            (SlotKind::Int, Value::Int(i)) => Slot::Int(i),
            (_, value) => Slot::Boxed(value),
        };
        Ok(())
    }

    /// Load `slot` as the reading node expects it.
    pub fn read(&self, slot: usize, expect: ReadKind) -> Result<Value, RuntimeError> {
        let value = match self.slots.get(slot) {
            None => {
                return Err(RuntimeError::SlotOutOfBounds {
                    slot,
                    size: self.slots.len(),
                });
            }
            Some(Slot::Empty) => return Err(RuntimeError::UninitializedRead { slot }),
            Some(Slot::Int(i)) => Value::Int(*i),
            Some(Slot::Boxed(v)) => v.clone(),
        };
        casting::coerce(value, expect).map_err(|CastError::NoImplicitCast { from, to }| {
            RuntimeError::TypeMismatch {
                slot,
                expected: to,
                found: from,
            }
        })
    }
}
