//! Read-through cache for region expansions.
//!
//! Expansion is deterministic in `(region, resolution)`, so results are
//! shared across every batch that needs them. Each key owns a `OnceCell`
//! slot: the slot is fetched or created under the LRU lock, and the
//! expansion runs outside the lock inside `get_or_try_init`. Concurrent
//! callers for the same key block on the slot instead of expanding again,
//! and a reader never sees a partially written set. A failed expansion leaves
//! the slot empty for the next caller to retry.

use crate::cell_set::UniformCellSet;
use crate::error::Result;
use geoimpact_core::{GeoRegionId, Resolution};
use lru::LruCache;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellSetKey {
    pub region: GeoRegionId,
    pub resolution: Resolution,
}

impl CellSetKey {
    pub fn new(region: GeoRegionId, resolution: Resolution) -> Self {
        Self { region, resolution }
    }
}

type Slot = Arc<OnceCell<Arc<UniformCellSet>>>;

/// Hit/miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    /// Expansions actually computed.
    pub misses: u64,
}

/// Thread-safe LRU of expanded cell sets.
pub struct CellSetCache {
    inner: RwLock<LruCache<CellSetKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CellSetCache {
    /// Zero capacity is treated as one entry.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn slot(&self, key: &CellSetKey) -> Slot {
        let mut lru = self.inner.write();
        if let Some(slot) = lru.get(key) {
            return slot.clone();
        }
        let slot = Slot::default();
        lru.put(key.clone(), slot.clone());
        slot
    }

    /// Return the cached set for `key`, computing it with `expand` on a miss.
    pub fn get_or_try_insert_with<F>(&self, key: &CellSetKey, expand: F) -> Result<Arc<UniformCellSet>>
    where
        F: FnOnce() -> Result<UniformCellSet>,
    {
        let slot = self.slot(key);
        let mut computed = false;
        let set = slot.get_or_try_init(|| {
            computed = true;
            expand().map(Arc::new)
        })?;
        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(set.clone())
    }

    /// Completed entry without updating LRU order.
    pub fn peek(&self, key: &CellSetKey) -> Option<Arc<UniformCellSet>> {
        self.inner.read().peek(key).and_then(|slot| slot.get().cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for CellSetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellSetCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellIndex;
    use crate::error::GridError;

    fn key(region: &str, res: i64) -> CellSetKey {
        CellSetKey::new(region.into(), Resolution::new(res).unwrap())
    }

    fn set(res: i64) -> UniformCellSet {
        let r = Resolution::new(res).unwrap();
        let cells = CellIndex::from_parts(8, &[3]).unwrap().children(r.get());
        UniformCellSet::from_cells(r, cells).unwrap()
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = CellSetCache::new(4);
        let k = key("r", 2);
        let a = cache.get_or_try_insert_with(&k, || Ok(set(2))).unwrap();
        let b = cache
            .get_or_try_insert_with(&k, || panic!("must not recompute"))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert!(cache.peek(&k).is_some());
    }

    #[test]
    fn failure_is_not_cached() {
        let cache = CellSetCache::new(4);
        let k = key("r", 2);
        let err = cache
            .get_or_try_insert_with(&k, || Err(GridError::RegionNotFound("r".into())))
            .unwrap_err();
        assert!(matches!(err, GridError::RegionNotFound(_)));
        assert!(cache.peek(&k).is_none());
        assert!(cache.get_or_try_insert_with(&k, || Ok(set(2))).is_ok());
    }

    #[test]
    fn lru_evicts_oldest() {
        let cache = CellSetCache::new(2);
        for res in 1..=3 {
            cache
                .get_or_try_insert_with(&key("r", res), || Ok(set(res)))
                .unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.peek(&key("r", 1)).is_none());
        assert!(cache.peek(&key("r", 3)).is_some());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        assert_eq!(CellSetCache::new(0).capacity(), 1);
    }
}
