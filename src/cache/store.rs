//! In-memory LRU store for vision results.

use lru::LruCache;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::AdapterConfig;

const SELF_CHECK_KEY: &str = "__cache_self_check__";
const SELF_CHECK_VALUE: &str = "ok";

/// Time source for entry ages.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Useful for expiry tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

struct State {
    // Unbounded: capacity is enforced in `set` so evictions can be counted.
    entries: LruCache<String, CacheEntry>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl State {
    fn new() -> Self {
        Self {
            entries: LruCache::unbounded(),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }
}

/// Point-in-time view of the store counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// hits / (hits + misses), 0.0 before the first lookup
    pub hit_rate: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub max_size: usize,
    pub ttl_secs: u64,
}

impl CacheStats {
    /// Hit rate as a percentage rounded to two decimals.
    pub fn hit_rate_percent(&self) -> f64 {
        (self.hit_rate * 10_000.0).round() / 100.0
    }
}

/// Capacity- and age-bounded cache of image descriptions.
///
/// Every operation takes the single internal lock, so recency updates and
/// counters always move together. Operations never fail; a poisoned lock is
/// recovered.
pub struct ImageCache {
    state: Mutex<State>,
    max_size: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ImageCache {
    /// `max_size` of 0 is treated as 1.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(State::new()),
            max_size: max_size.max(1),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: &AdapterConfig) -> Self {
        Self::new(config.cache_max_size, config.cache_ttl())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, promoting it on a hit. Expired entries are removed and
    /// counted as both a miss and an eviction.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut guard = self.lock();
        let state = &mut *guard;

        let expired = state
            .entries
            .peek(key)
            .map(|entry| now.saturating_duration_since(entry.inserted_at) > self.ttl);

        match expired {
            None => {
                state.misses += 1;
                None
            }
            Some(true) => {
                state.entries.pop(key);
                state.misses += 1;
                state.evictions += 1;
                None
            }
            Some(false) => {
                state.hits += 1;
                state.entries.get(key).map(|entry| entry.value.clone())
            }
        }
    }

    /// Insert or overwrite `key`. An empty key is ignored. Inserting a new key
    /// into a full store evicts the least recently used entry first.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        if key.is_empty() {
            return;
        }
        let entry = CacheEntry {
            value: value.into(),
            inserted_at: self.clock.now(),
        };

        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.entries.contains(key) && state.entries.len() >= self.max_size {
            if state.entries.pop_lru().is_some() {
                state.evictions += 1;
            }
        }
        state.entries.put(key.to_string(), entry);
    }

    /// Remove `key`; reports whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().entries.pop(key).is_some()
    }

    /// Drop every entry and reset all counters.
    pub fn clear(&self) {
        *self.lock() = State::new();
    }

    /// Presence check that neither promotes nor counts.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let lookups = state.hits + state.misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            state.hits as f64 / lookups as f64
        };
        CacheStats {
            hit_rate,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            size: state.entries.len(),
            max_size: self.max_size,
            ttl_secs: self.ttl.as_secs(),
        }
    }

    /// Write, read back and remove a check entry under one lock. Counters,
    /// recency and existing entries are left as they were.
    pub fn self_check(&self) -> bool {
        let mut guard = self.lock();
        let entries = &mut guard.entries;
        entries.put(
            SELF_CHECK_KEY.to_string(),
            CacheEntry {
                value: SELF_CHECK_VALUE.to_string(),
                inserted_at: self.clock.now(),
            },
        );
        let ok = entries
            .peek(SELF_CHECK_KEY)
            .is_some_and(|entry| entry.value == SELF_CHECK_VALUE);
        entries.pop(SELF_CHECK_KEY);
        ok
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("max_size", &self.max_size)
            .field("ttl", &self.ttl)
            .field("size", &self.len())
            .finish()
    }
}
