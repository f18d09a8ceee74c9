//! Name → id resolution with per-site inline caches.
//!
//! The [`NameRegistry`] is shared by every call target of an engine and holds
//! only the authoritative mapping plus an epoch that counts mapping changes.
//! The chains themselves live in a [`NameCache`] owned by one call target, so
//! they go away with it. Before use, a cache is synced to the registry epoch;
//! a mapping change therefore drops every chain built against the old
//! mapping, including cached misses.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::cache::chain::{Append, ChainArena, ChainHead, MAX_CHAIN_LIMIT};

/// Call-site cache state for one name lookup in the graph.
pub type NameSite = ChainHead;

/// Chains of every name site of one call target.
pub type NameCache = ChainArena<Arc<str>, Option<i64>>;

/// Authoritative name → id mapping.
#[derive(Debug)]
pub struct NameRegistry {
    map: RwLock<HashMap<Arc<str>, i64>>,
    epoch: AtomicU64,
    cache_limit: usize,
}

impl NameRegistry {
    /// A registry whose caches hold at most `cache_limit` entries per site,
    /// capped to [`MAX_CHAIN_LIMIT`].
    pub fn new(cache_limit: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
            cache_limit: cache_limit.min(MAX_CHAIN_LIMIT),
        }
    }

    /// Map `name` to `id`. The last write for a name wins.
    pub fn add_mapping(&self, name: &str, id: i64) {
        let mut map = self.map.write();
        map.insert(Arc::from(name), id);
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(name, id, epoch, "name mapping added");
    }

    /// Number of mapping changes so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// The full, uncached lookup.
    pub fn lookup(&self, name: &str) -> Option<i64> {
        self.map.read().get(name).copied()
    }

    /// A cache for the name sites of one call target.
    pub fn new_cache(&self) -> NameCache {
        NameCache::new(self.cache_limit)
    }

    /// Resolve through the chain of `site` in `cache`.
    ///
    /// Keys match by pointer identity first, then by text.
    pub fn resolve(&self, cache: &NameCache, site: &NameSite, name: &Arc<str>) -> Option<i64> {
        // Read the epoch before the mapping: a value read after a concurrent
        // change is tagged with the older epoch and dropped on the next sync.
        let generation = cache.sync(self.epoch());
        let cached = cache.lookup(site, |key| Arc::ptr_eq(key, name) || **key == **name);
        if let Some(id) = cached {
            site.record(true);
            return id;
        }
        site.record(false);

        let id = self.lookup(name);
        if cache.try_append(site, generation, Arc::clone(name), id) == Append::Frozen {
            trace!(name = %name, "name cache frozen, using full lookup");
        }
        id
    }

    pub fn cache_limit(&self) -> usize {
        self.cache_limit
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new(crate::api::DEFAULT_CACHE_LIMIT)
    }
}
