use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::network::State;

static NEXT_ACCESSOR: AtomicU64 = AtomicU64::new(1);

/// Typed access to the per-state traversal tag.
///
/// Each state holds a single tag slot. Storing through an accessor claims
/// the slot for it; a slot last written by another accessor reads as empty.
#[derive(Debug)]
pub struct StateInfo<V> {
    id: u64,
    _marker: PhantomData<fn() -> V>,
}

impl<V: Clone + Send + 'static> StateInfo<V> {
    pub fn new() -> Self {
        Self {
            id: NEXT_ACCESSOR.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }

    pub fn store(&self, state: &State, value: V) {
        *state.tag.lock() = Some((self.id, Box::new(value)));
    }

    pub fn get(&self, state: &State) -> Option<V> {
        match &*state.tag.lock() {
            Some((id, value)) if *id == self.id => value.downcast_ref::<V>().cloned(),
            _ => None,
        }
    }
}

impl<V: Clone + Send + 'static> Default for StateInfo<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BooleanNetwork;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_store_then_get() {
        let network = BooleanNetwork::new(1, |_, _| false).unwrap();
        let state = network.state(0).unwrap();
        let info = StateInfo::<String>::new();
        assert_eq!(info.get(&state), None);
        info.store(&state, "seen".to_string());
        assert_eq!(info.get(&state), Some("seen".to_string()));
    }

    #[test]
    fn test_other_accessor_sees_nothing() {
        let network = BooleanNetwork::new(1, |_, _| false).unwrap();
        let state = network.state(1).unwrap();
        let first = StateInfo::<u32>::new();
        let second = StateInfo::<u32>::new();

        first.store(&state, 7);
        assert_eq!(second.get(&state), None);

        // The slot is shared: the second store evicts the first tag.
        second.store(&state, 9);
        assert_eq!(second.get(&state), Some(9));
        assert_eq!(first.get(&state), None);
    }
}
