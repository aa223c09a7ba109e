//! LRU transform cache (§4.6, C7).
//!
//! Keyed by a 256-bit content hash of the operand words plus the
//! transform shape `(k, n)`, so two different integers that happen to
//! hash-collide on a truncated key never alias. Reader-preferred: many
//! `get`s can proceed concurrently, a `put` takes the list exclusively.
//! Every entry returned from `get` is a clone of the stored value
//! buffers — callers always own what they got back.

use std::collections::HashMap;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

/// 256-bit key: `sha256(operand words || k || n)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn compute(words: &[u64], k: u32, n: usize) -> Self {
        let mut hasher = Sha256::new();
        for w in words {
            hasher.update(w.to_le_bytes());
        }
        hasher.update(k.to_le_bytes());
        hasher.update((n as u64).to_le_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        CacheKey(out)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TransformCacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
    /// Operands below this bit length are never cached; transforming
    /// them is cheaper than a hash and a lock round-trip.
    pub min_bits: u64,
}

impl Default for TransformCacheConfig {
    fn default() -> Self {
        TransformCacheConfig {
            enabled: true,
            max_entries: 128,
            min_bits: 100_000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TransformCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Entry {
    key: CacheKey,
    values: Vec<Vec<u64>>,
}

struct Inner {
    config: TransformCacheConfig,
    // Most-recently-used at the back.
    entries: Vec<Entry>,
    index: HashMap<CacheKey, usize>,
    stats: TransformCacheStats,
}

pub struct TransformCache {
    inner: RwLock<Inner>,
}

impl TransformCache {
    pub fn new(config: TransformCacheConfig) -> Self {
        TransformCache {
            inner: RwLock::new(Inner {
                config,
                entries: Vec::new(),
                index: HashMap::new(),
                stats: TransformCacheStats::default(),
            }),
        }
    }

    pub fn reconfigure(&self, config: TransformCacheConfig) {
        let mut inner = self.inner.write();
        inner.config = config;
        while inner.entries.len() > config.max_entries {
            evict_oldest(&mut inner);
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.index.clear();
    }

    pub fn stats(&self) -> TransformCacheStats {
        self.inner.read().stats
    }

    /// Returns a clone of the cached values, if present, and bumps
    /// recency.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Vec<u64>>> {
        {
            let inner = self.inner.read();
            if !inner.config.enabled {
                return None;
            }
            if let Some(&pos) = inner.index.get(key) {
                let values = inner.entries[pos].values.clone();
                drop(inner);
                let mut inner = self.inner.write();
                inner.stats.hits += 1;
                touch(&mut inner, pos);
                return Some(values);
            }
        }
        let mut inner = self.inner.write();
        inner.stats.misses += 1;
        None
    }

    /// Inserts a freshly computed transform, evicting the least
    /// recently used entry if the cache is full. No-op if the operand
    /// is below the configured bit-length floor, or caching is off.
    pub fn put(&self, key: CacheKey, operand_bits: u64, values: Vec<Vec<u64>>) {
        let mut inner = self.inner.write();
        if !inner.config.enabled || operand_bits < inner.config.min_bits {
            return;
        }
        if inner.index.contains_key(&key) {
            return;
        }
        while inner.entries.len() >= inner.config.max_entries {
            evict_oldest(&mut inner);
        }
        let pos = inner.entries.len();
        inner.entries.push(Entry { key, values });
        inner.index.insert(key, pos);
    }
}

fn touch(inner: &mut Inner, pos: usize) {
    let last = inner.entries.len() - 1;
    if pos != last {
        inner.entries.swap(pos, last);
        let moved_key = inner.entries[pos].key;
        let swapped_key = inner.entries[last].key;
        inner.index.insert(moved_key, pos);
        inner.index.insert(swapped_key, last);
    }
}

fn evict_oldest(inner: &mut Inner) {
    if inner.entries.is_empty() {
        return;
    }
    let evicted = inner.entries.remove(0);
    inner.index.remove(&evicted.key);
    for (pos, entry) in inner.entries.iter().enumerate() {
        inner.index.insert(entry.key, pos);
    }
    inner.stats.evictions += 1;
    tracing::trace!("transform cache evicted an entry");
}
