//! Polymorphic element access.
//!
//! Each element-access node caches up to `cache_limit` shapes it has seen,
//! each paired with the reader specialized to that shape. A shape miss on a
//! full chain turns the site megamorphic for good: it stops consulting the
//! cache and always takes the generic dispatch.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::{
    cache::chain::{Append, ChainArena, ChainHead},
    values::{ArrayLike, ShapeId, Value},
};

/// Shape-specialized item reader.
pub type ElementReader = fn(&ArrayLike, i64) -> Option<Value>;

pub type ShapeArena = ChainArena<ShapeId, ElementReader>;

#[derive(Debug, Default)]
pub struct ElementSite {
    head: ChainHead,
    megamorphic: AtomicBool,
}

impl ElementSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_megamorphic(&self) -> bool {
        self.megamorphic.load(Ordering::Acquire)
    }

    pub fn head(&self) -> &ChainHead {
        &self.head
    }

    /// Read `array[index]`. Results are identical to [`ArrayLike::get_item`].
    pub fn get_element(&self, shapes: &ShapeArena, array: &ArrayLike, index: i64) -> Option<Value> {
        if self.is_megamorphic() {
            return array.get_item(index);
        }

        let shape = array.shape();
        if let Some(reader) = shapes.lookup(&self.head, |cached| *cached == shape) {
            self.head.record(true);
            return reader(array, index);
        }
        self.head.record(false);

        let reader = reader_for(shape);
        match shapes.try_append(&self.head, shapes.generation(), shape, reader) {
            Append::Frozen => {
                debug!(?shape, "element site went megamorphic");
                self.megamorphic.store(true, Ordering::Release);
            }
            Append::Appended | Append::Present | Append::Stale => {}
        }
        reader(array, index)
    }
}

fn reader_for(shape: ShapeId) -> ElementReader {
    match shape {
        ShapeId::Dense => read_dense,
        ShapeId::Sequence => read_sequence,
        ShapeId::Custom(_) => read_custom,
    }
}

// Each reader re-checks its shape and defers to the generic path otherwise,
// so a reader can never be applied to the wrong representation.

fn read_dense(array: &ArrayLike, index: i64) -> Option<Value> {
    match array {
        ArrayLike::Dense(items) => usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned(),
        _ => array.get_item(index),
    }
}

fn read_sequence(array: &ArrayLike, index: i64) -> Option<Value> {
    match array {
        ArrayLike::Sequence(seq) => Some(Value::Int(seq.get_item(index))),
        _ => array.get_item(index),
    }
}

fn read_custom(array: &ArrayLike, index: i64) -> Option<Value> {
    match array {
        ArrayLike::Custom(items) => items.get_item(index),
        _ => array.get_item(index),
    }
}
