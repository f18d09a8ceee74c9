//! Bounded, append-only cache chains.
//!
//! A chain is a singly-linked list of `(key, value)` entries, newest first.
//! Entries live in a [`ChainArena`] and link to each other by index; a call
//! site only owns a [`ChainHead`], one atomic word naming its newest entry and
//! the arena generation that entry belongs to.
//!
//! Invalidation bumps the arena generation and drops every entry. Heads
//! tagged with an older generation read as empty, so no head has to be
//! visited. Appends happen under the arena's write lock and are rejected if
//! the generation moved since the caller computed the value, which keeps a
//! value computed before an invalidation from being published after it.
//!
//! A head packs the generation into its upper 40 bits and the entry slot
//! into the lower 24. Generations never wrap: once an arena passes
//! [`MAX_GENERATION`] it stops caching and every lookup misses.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{trace, warn};

/// Longest chain an arena supports.
pub const MAX_CHAIN_LIMIT: usize = u8::MAX as usize;

/// Last generation a head can name.
pub const MAX_GENERATION: u64 = (1 << GENERATION_BITS) - 1;

const GENERATION_BITS: u32 = 40;
const SLOT_BITS: u32 = 64 - GENERATION_BITS;
const SLOT_MASK: u64 = (1 << SLOT_BITS) - 1;
/// Slot `0` marks an empty head, so the last usable index is one less.
const MAX_ENTRIES: usize = SLOT_MASK as usize;

/// Per-site pointer into a [`ChainArena`].
#[derive(Debug, Default)]
pub struct ChainHead {
    packed: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ChainHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn load(&self) -> u64 {
        self.packed.load(Ordering::Acquire)
    }

    fn store(&self, generation: u64, index: usize) {
        let packed = (generation << SLOT_BITS) | (index as u64 + 1);
        self.packed.store(packed, Ordering::Release);
    }

    pub(crate) fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// One immutable chain entry. `length` counts this entry and everything
/// after it.
#[derive(Debug)]
struct ChainEntry<K, V> {
    key: K,
    value: V,
    next: Option<u32>,
    length: u8,
}

#[derive(Debug)]
struct ArenaInner<K, V> {
    generation: u64,
    entries: Vec<ChainEntry<K, V>>,
}

impl<K, V> ArenaInner<K, V> {
    /// Index of the head entry, if `packed` belongs to the live generation.
    fn resolve(&self, packed: u64) -> Option<usize> {
        let generation = packed >> SLOT_BITS;
        let slot = packed & SLOT_MASK;
        if slot == 0 || generation != self.generation || self.is_exhausted() {
            return None;
        }
        let index = (slot - 1) as usize;
        (index < self.entries.len()).then_some(index)
    }

    fn is_exhausted(&self) -> bool {
        self.generation > MAX_GENERATION
    }

    fn reset(&mut self, generation: u64) {
        self.generation = generation;
        self.entries.clear();
        if self.is_exhausted() {
            warn!(generation, "cache arena ran out of generations, caching disabled");
        } else {
            trace!(generation, "cache arena invalidated");
        }
    }

    fn chain(&self, start: Option<usize>) -> impl Iterator<Item = &ChainEntry<K, V>> {
        let mut next = start;
        std::iter::from_fn(move || {
            let entry = self.entries.get(next?)?;
            next = entry.next.map(|n| n as usize);
            Some(entry)
        })
    }
}

/// Outcome of [`ChainArena::try_append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    Appended,
    /// The chain reached its bound; it will never grow again this generation.
    Frozen,
    /// The key is already cached (a concurrent miss got there first).
    Present,
    /// The arena was invalidated after the value was computed, or has run
    /// out of generations.
    Stale,
}

/// Storage for all chains of one cache family.
#[derive(Debug)]
pub struct ChainArena<K, V> {
    inner: RwLock<ArenaInner<K, V>>,
    limit: u8,
}

impl<K, V> ChainArena<K, V>
where
    K: PartialEq,
    V: Clone,
{
    /// An arena whose chains hold at most `limit` entries. Limits past
    /// [`MAX_CHAIN_LIMIT`] are capped to it.
    pub fn new(limit: usize) -> Self {
        Self {
            inner: RwLock::new(ArenaInner {
                generation: 0,
                entries: Vec::new(),
            }),
            limit: u8::try_from(limit).unwrap_or(u8::MAX),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit as usize
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Entries currently held, across all chains.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scan the chain at `head`, newest first.
    pub fn lookup(&self, head: &ChainHead, matches: impl Fn(&K) -> bool) -> Option<V> {
        let inner = self.inner.read();
        let start = inner.resolve(head.load());
        inner
            .chain(start)
            .find(|entry| matches(&entry.key))
            .map(|entry| entry.value.clone())
    }

    /// Number of entries in the chain at `head`.
    pub fn chain_len(&self, head: &ChainHead) -> usize {
        let inner = self.inner.read();
        inner
            .resolve(head.load())
            .and_then(|i| inner.entries.get(i))
            .map_or(0, |entry| entry.length as usize)
    }

    /// Whether the chain at `head` can no longer grow.
    pub fn is_frozen(&self, head: &ChainHead) -> bool {
        self.chain_len(head) >= self.limit()
    }

    /// Push `(key, value)` in front of the chain at `head`, provided the
    /// chain is under its bound and the arena is still at `generation`.
    pub fn try_append(&self, head: &ChainHead, generation: u64, key: K, value: V) -> Append {
        let mut inner = self.inner.write();
        if inner.generation != generation || inner.is_exhausted() {
            return Append::Stale;
        }
        let current = inner.resolve(head.load());
        if inner.chain(current).any(|entry| entry.key == key) {
            return Append::Present;
        }
        let length = current
            .and_then(|i| inner.entries.get(i))
            .map_or(0, |entry| entry.length);
        if length >= self.limit {
            return Append::Frozen;
        }
        let index = inner.entries.len();
        if index >= MAX_ENTRIES {
            return Append::Frozen;
        }
        inner.entries.push(ChainEntry {
            key,
            value,
            next: current.map(|i| i as u32),
            length: length + 1,
        });
        head.store(inner.generation, index);
        trace!(length = length + 1, "cache chain extended");
        Append::Appended
    }

    /// Drop every chain. Heads pointing into the old generation read as empty.
    pub fn invalidate(&self) {
        let mut inner = self.inner.write();
        let next = inner.generation.saturating_add(1);
        inner.reset(next);
    }

    /// Move the arena forward to `generation`, dropping every chain, unless
    /// it is already there. Returns the generation the arena is at.
    ///
    /// Lets an arena follow an external version counter; an older
    /// `generation` is ignored.
    pub fn sync(&self, generation: u64) -> u64 {
        let current = self.inner.read().generation;
        if current >= generation {
            return current;
        }
        let mut inner = self.inner.write();
        if inner.generation < generation {
            inner.reset(generation);
        }
        inner.generation
    }
}
