//! Image Cache Store Module
//!
//! Maps image URLs to fetched payloads. Concurrent requests for one key share
//! a single fetch, non-priority fetches are admission-limited, entries expire
//! by age and the oldest fifth of the capacity is evicted on overflow.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::eviction::{eviction_count, select_oldest};
use crate::cache::stats::{Counters, ImageCacheStats};
use crate::cache::{CacheEntry, ImagePayload};

/// Future returned by [`ImageCache::get_image`].
///
/// Resolves to a data URI, or to an empty string when the image was not
/// loaded and the caller should load it directly.
pub type ImageFuture = BoxFuture<'static, String>;

type SharedLoad = Shared<BoxFuture<'static, String>>;

// == Image Cache Config ==
#[derive(Debug, Clone)]
pub struct ImageCacheConfig {
    /// Entry count above which an eviction pass runs
    pub max_size: usize,
    /// Lifetime of an entry
    pub max_age: Duration,
    /// Simultaneous non-priority fetch admissions
    pub load_limit: usize,
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            max_size: 200,
            max_age: Duration::from_secs(30 * 60),
            load_limit: 6,
        }
    }
}

struct InFlight {
    ticket: u64,
    load: SharedLoad,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, InFlight>,
    concurrent_loads: usize,
    /// Bumped by `clear()`; loads started under an older epoch skip bookkeeping
    epoch: u64,
    next_sequence: u64,
    next_ticket: u64,
    counters: Counters,
}

impl CacheState {
    /// Writes an entry and runs an eviction pass if capacity is exceeded.
    fn insert(&mut self, key: &str, payload: ImagePayload, now: u64, max_size: usize) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries
            .insert(key.to_string(), CacheEntry::new(payload, now, sequence));

        if self.entries.len() > max_size {
            let victims = select_oldest(&self.entries, eviction_count(max_size), key);
            for victim in &victims {
                self.entries.remove(victim);
            }
            self.counters.evictions += victims.len() as u64;
            if !victims.is_empty() {
                debug!(
                    "Image cache over capacity, evicted {} oldest entries",
                    victims.len()
                );
            }
        }
    }
}

struct Inner {
    state: Mutex<CacheState>,
    clock: Arc<dyn Clock>,
    max_size: usize,
    max_age_ms: u64,
    load_limit: usize,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock is still safe to reuse.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// == Image Cache ==
/// Shared handle to one image cache. Clones refer to the same cache.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<Inner>,
}

impl ImageCache {
    // == Constructor ==
    pub fn new(config: ImageCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: ImageCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CacheState::default()),
                clock,
                max_size: config.max_size,
                max_age_ms: config.max_age.as_millis() as u64,
                load_limit: config.load_limit,
            }),
        }
    }

    // == Get Image ==
    /// Returns the image for `key`, loading it with `loader` if needed.
    ///
    /// Resolution order:
    /// 1. a fresh cached entry resolves immediately;
    /// 2. an in-flight fetch for the same key is shared;
    /// 3. a non-priority request over the load limit resolves to `""`
    ///    without fetching;
    /// 4. otherwise `loader` runs on its own task and the result is cached.
    ///
    /// Registration happens when this is called, not when the future is
    /// first polled. Loader errors and panics resolve to `""`. Must be
    /// called within a Tokio runtime.
    pub fn get_image<F, Fut, E>(&self, key: &str, loader: F, priority: bool) -> ImageFuture
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ImagePayload, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let now = self.inner.clock.now_ms();
        let mut state = self.inner.lock();

        if let Some(entry) = state.entries.get(key) {
            if entry.is_fresh(now, self.inner.max_age_ms) {
                let uri = entry.data_uri();
                state.counters.hits += 1;
                return future::ready(uri).boxed();
            }
        }
        state.counters.misses += 1;

        if let Some(flight) = state.in_flight.get(key) {
            let load = flight.load.clone();
            state.counters.coalesced += 1;
            return load.boxed();
        }

        if !priority && state.concurrent_loads >= self.inner.load_limit {
            state.counters.rejected += 1;
            debug!(
                "Image load for {} declined, {} loads already running",
                key, state.concurrent_loads
            );
            return future::ready(String::new()).boxed();
        }

        state.concurrent_loads += 1;
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        let epoch = state.epoch;

        let cache = self.clone();
        let owned_key = key.to_string();
        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(async move { loader().await })
                .catch_unwind()
                .await;
            match outcome {
                Ok(result) => cache.finish_load(&owned_key, ticket, epoch, result),
                Err(_) => cache.finish_load(
                    &owned_key,
                    ticket,
                    epoch,
                    Err::<ImagePayload, _>("loader panicked"),
                ),
            }
        });

        let load = task
            .map(|joined| joined.unwrap_or_default())
            .boxed()
            .shared();
        state.in_flight.insert(
            key.to_string(),
            InFlight {
                ticket,
                load: load.clone(),
            },
        );

        load.boxed()
    }

    /// Bookkeeping for a finished load; runs before the load's waiters wake.
    fn finish_load<E: fmt::Display>(
        &self,
        key: &str,
        ticket: u64,
        epoch: u64,
        result: Result<ImagePayload, E>,
    ) -> String {
        let now = self.inner.clock.now_ms();
        let mut state = self.inner.lock();
        let current = state.epoch == epoch;

        if current {
            if state
                .in_flight
                .get(key)
                .is_some_and(|flight| flight.ticket == ticket)
            {
                state.in_flight.remove(key);
            }
            state.concurrent_loads = state.concurrent_loads.saturating_sub(1);
        }

        match result {
            Ok(payload) => {
                let uri = payload.data_uri();
                if current {
                    state.insert(key, payload, now, self.inner.max_size);
                }
                uri
            }
            Err(err) => {
                if current {
                    state.counters.failures += 1;
                }
                warn!("Image load failed for {}: {}", key, err);
                String::new()
            }
        }
    }

    // == Has ==
    /// True iff `key` is cached and fresh.
    pub fn has(&self, key: &str) -> bool {
        let now = self.inner.clock.now_ms();
        let state = self.inner.lock();
        state
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now, self.inner.max_age_ms))
    }

    // == Set ==
    /// Inserts already-available data, bypassing admission control.
    pub fn set(&self, key: &str, data: impl Into<String>, content_type: impl Into<String>) {
        let now = self.inner.clock.now_ms();
        let mut state = self.inner.lock();
        state.insert(
            key,
            ImagePayload::new(data, content_type),
            now,
            self.inner.max_size,
        );
    }

    // == Clear ==
    /// Drops all entries and in-flight registrations.
    ///
    /// Running fetches are not cancelled; their results still reach their
    /// waiters but are not written back.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.entries.clear();
        state.in_flight.clear();
        state.concurrent_loads = 0;
        state.epoch += 1;
    }

    // == Stats ==
    pub fn stats(&self) -> ImageCacheStats {
        let state = self.inner.lock();
        ImageCacheStats {
            size: state.entries.len(),
            max_size: self.inner.max_size,
            concurrent_loads: state.concurrent_loads,
            pending_loads: state.in_flight.len(),
            hits: state.counters.hits,
            misses: state.counters.misses,
            coalesced: state.counters.coalesced,
            rejected: state.counters.rejected,
            failures: state.counters.failures,
            evictions: state.counters.evictions,
        }
    }

    // == Length ==
    /// Number of entries held, including stale ones.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCache")
            .field("stats", &self.stats())
            .field("max_age_ms", &self.inner.max_age_ms)
            .field("load_limit", &self.inner.load_limit)
            .finish()
    }
}
