//! `SearchCache`: bounded, TTL-aware cache keyed by `(provider, query,
//! profile, freshness_bucket)` (spec.md §4.3). Concurrent-safe; writers hold
//! the LRU lock only during eviction/insertion bookkeeping.

use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

use crate::types::Source;

/// Deterministic cache key. `freshness_bucket` lets callers vary recency
/// requirements (e.g. "last 24h" vs "any time") without colliding with an
/// otherwise-identical query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: String,
    pub normalized_query: String,
    pub profile: String,
    pub freshness_bucket: String,
}

impl CacheKey {
    /// Normalizes (lower-cases, trims) the query before building the key,
    /// per spec.md §4.3.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        query: &str,
        profile: impl Into<String>,
        freshness_bucket: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            normalized_query: query.trim().to_lowercase(),
            profile: profile.into(),
            freshness_bucket: freshness_bucket.into(),
        }
    }
}

#[derive(Clone)]
struct CacheEntry {
    value: Vec<Source>,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

struct Counters {
    hits: u64,
    misses: u64,
}

/// Bounded TTL + LRU cache for search results. `get` never mutates entries
/// (returns a defensive clone); capacity 0 degrades to a pass-through cache
/// where every lookup misses, per spec.md §8 boundary behavior.
pub struct SearchCache {
    inner: Mutex<LruCacheInner>,
    default_ttl: Duration,
}

struct LruCacheInner {
    entries: Option<LruCache<CacheKey, CacheEntry>>,
    counters: Counters,
}

impl SearchCache {
    #[must_use]
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        let entries = NonZeroUsize::new(max_size).map(LruCache::new);
        Self {
            inner: Mutex::new(LruCacheInner { entries, counters: Counters { hits: 0, misses: 0 } }),
            default_ttl,
        }
    }

    /// Returns a clone of the cached value if present and unexpired.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Source>> {
        let mut guard = self.inner.lock();
        let Some(cache) = guard.entries.as_mut() else {
            guard.counters.misses += 1;
            return None;
        };
        let hit = match cache.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        };
        if hit.is_some() {
            guard.counters.hits += 1;
        } else {
            guard.counters.misses += 1;
        }
        hit
    }

    /// Inserts `value` under `key` using the cache's default TTL. Expired
    /// entries are evicted first, then LRU if still over capacity.
    pub fn put(&self, key: CacheKey, value: Vec<Source>) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    pub fn put_with_ttl(&self, key: CacheKey, value: Vec<Source>, ttl: Duration) {
        let mut guard = self.inner.lock();
        let Some(cache) = guard.entries.as_mut() else {
            return;
        };
        evict_expired(cache);
        cache.put(key, CacheEntry { value, inserted_at: Instant::now(), ttl });
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.inner.lock().counters.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.inner.lock().counters.misses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.as_ref().map_or(0, LruCache::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict_expired(cache: &mut LruCache<CacheKey, CacheEntry>) {
    let expired: Vec<CacheKey> =
        cache.iter().filter(|(_, e)| e.is_expired()).map(|(k, _)| k.clone()).collect();
    for key in expired {
        cache.pop(&key);
    }
}

/// Buckets a raw time-sensitivity window into a small discrete label so
/// near-identical freshness requirements share a cache key.
#[must_use]
pub fn freshness_bucket(window_days: Option<f64>) -> String {
    match window_days {
        None => "any".to_string(),
        Some(d) if d <= 1.0 => "day".to_string(),
        Some(d) if d <= 7.0 => "week".to_string(),
        Some(d) if d <= 30.0 => "month".to_string(),
        Some(_) => "year".to_string(),
    }
}
