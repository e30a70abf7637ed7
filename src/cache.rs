//! Bounded LRU memo for pairwise great-circle distances
//!
//! The cache is a best-effort performance layer over a total function: it can
//! never fail, and its presence or absence never changes a clustering result,
//! only its cost. It assumes exclusive sequential ownership; callers sharing it
//! across threads must wrap it in a mutex.

use crate::distance::haversine_km;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Default number of cached distance entries
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Quantization scale for cache keys: 10^6, i.e. 6 decimal places of a degree
/// (about 0.11 m of resolution at the equator)
pub const COORDINATE_QUANT_SCALE: f64 = 1e6;

/// Cache key for a coordinate pair
///
/// Coordinates are discretized to integer micro-degrees *before* key
/// construction, so two lookups with negligibly different coordinates (repeated
/// screen redraws of the same positions) share an entry. An integer tuple key
/// avoids the floating-point hashing and locale-dependent formatting pitfalls
/// of stringified keys.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
struct QuantizedKey([i64; 4]);

impl QuantizedKey {
    #[inline]
    fn new(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Self {
        Self([
            quantize(lat1),
            quantize(lon1),
            quantize(lat2),
            quantize(lon2),
        ])
    }
}

#[inline]
fn quantize(degrees: f64) -> i64 {
    (degrees * COORDINATE_QUANT_SCALE).round() as i64
}

/// Snapshot of cache effectiveness counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to compute and insert
    pub misses: u64,
    /// Current number of entries
    pub len: usize,
    /// Maximum number of entries
    pub capacity: usize,
}

/// Bounded key-value store memoizing haversine distances
///
/// Entries are created on miss, promoted to most-recently-used on hit, and
/// silently evicted (least-recently-used first) once capacity is exceeded.
/// Capacity is fixed at construction.
#[derive(Debug)]
pub struct DistanceCache {
    entries: LruCache<QuantizedKey, f64>,
    hits: u64,
    misses: u64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl DistanceCache {
    /// Create a cache holding at most `capacity` entries
    ///
    /// A zero capacity is clamped to one entry; the cache must stay infallible.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up the distance for a coordinate pair, computing it on miss
    ///
    /// Returns the great-circle distance in kilometers. Numerically identical
    /// to calling [`haversine_km`] directly; only the cost differs. A hit
    /// promotes the entry to most-recently-used; a miss inserts it there,
    /// evicting the least-recently-used entry if the cache is full.
    pub fn get_or_compute(&mut self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let key = QuantizedKey::new(lat1, lon1, lat2, lon2);

        if let Some(&distance) = self.entries.get(&key) {
            self.hits += 1;
            return distance;
        }

        let distance = haversine_km(lat1, lon1, lat2, lon2);
        self.entries.put(key, distance);
        self.misses += 1;
        distance
    }

    /// Current number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Get effectiveness counters
    #[inline]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }

    /// Drop all entries and reset counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
