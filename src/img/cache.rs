//! Cost-bounded LRU caches for decoded subdivision batches.

use std::hash::Hash;
use std::sync::Arc;

use lru::LruCache;

use super::types::models::{Point, Polys};

/// Default budget of each query cache, in decoded features.
pub const DEFAULT_CACHE_CAPACITY: usize = 2048;

/// Identity of a subdivision: the tile it belongs to and its id inside that tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubDivKey {
    /// Index of the tile in the container's tile arena.
    pub tile: usize,
    pub subdiv: u32,
}

struct CacheEntry<V> {
    data: Arc<V>,
    cost: usize,
}

/// An LRU map whose entries carry a cost; the summed cost never exceeds the capacity.
///
/// An entry costing more than the whole capacity is not stored at all.
pub struct CostCache<K: Hash + Eq, V> {
    current_cost: usize,
    capacity: usize,
    entries: LruCache<K, CacheEntry<V>>,
}

impl<K: Hash + Eq, V> CostCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        CostCache {
            current_cost: 0,
            capacity,
            entries: LruCache::unbounded(),
        }
    }

    /// Looks up `key`, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).map(|entry| Arc::clone(&entry.data))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Inserts `data`, evicting least recently used entries until it fits.
    ///
    /// Every entry costs at least one, so the entry count is bounded by the
    /// capacity too. Returns `false` if the entry alone exceeds the capacity
    /// and was not cached.
    pub fn insert(&mut self, key: K, data: Arc<V>, cost: usize) -> bool {
        let cost = cost.max(1);
        if cost > self.capacity {
            return false;
        }

        if let Some(old) = self.entries.pop(&key) {
            self.current_cost = self.current_cost.saturating_sub(old.cost);
        }

        while self.current_cost + cost > self.capacity {
            if let Some((_key, entry)) = self.entries.pop_lru() {
                self.current_cost = self.current_cost.saturating_sub(entry.cost);
            } else {
                break;
            }
        }

        self.current_cost = self.current_cost.saturating_add(cost);
        self.entries.put(key, CacheEntry { data, cost });
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_cost = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_cost(&self) -> usize {
        self.current_cost
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The two caches shared by all tiles of one container.
pub struct QueryCaches {
    pub polys: CostCache<SubDivKey, Polys>,
    pub points: CostCache<SubDivKey, Vec<Point>>,
}

impl QueryCaches {
    pub fn new(capacity: usize) -> Self {
        Self {
            polys: CostCache::new(capacity),
            points: CostCache::new(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.polys.clear();
        self.points.clear();
    }
}
