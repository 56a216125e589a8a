//! Cache Statistics Module
//!
//! Snapshot of the image cache's occupancy and load counters.

use serde::Serialize;

// == Image Cache Stats ==
/// Point-in-time view of the image cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageCacheStats {
    /// Entries currently held (fresh or stale)
    pub size: usize,
    /// Capacity before an eviction pass runs
    pub max_size: usize,
    /// Fetches currently admitted
    pub concurrent_loads: usize,
    /// Keys with an in-flight fetch
    pub pending_loads: usize,
    /// Requests answered from a fresh entry
    pub hits: u64,
    /// Requests that found no fresh entry
    pub misses: u64,
    /// Requests that joined an existing fetch
    pub coalesced: u64,
    /// Non-priority requests turned away by admission control
    pub rejected: u64,
    /// Loader failures swallowed into the empty sentinel
    pub failures: u64,
    /// Entries removed by eviction passes
    pub evictions: u64,
}

impl ImageCacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Counters kept alongside the cache state.
#[derive(Debug, Clone, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub rejected: u64,
    pub failures: u64,
    pub evictions: u64,
}
