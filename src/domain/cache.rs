//! Memoization cache for computed indicator outputs.
//!
//! Entries are keyed by `"{indicator tag}|{fingerprint}"`, where the
//! fingerprint is a cheap summary of the close vector (length, first and last
//! value). The fingerprint is not collision-proof: two series of equal length
//! and equal endpoints alias. Windowed price data always moves its length or
//! its boundary values when the window changes, so that is acceptable here.
//!
//! The cache is an owned value handed to the pipeline by `&mut`; there is no
//! global state and no locking. Growth is governed by an [`EvictionPolicy`].

use std::collections::{HashMap, VecDeque};
use std::fmt;

/// `"{len}:{first}:{last}"`; an empty series fingerprints as `"0::"`.
pub fn fingerprint(values: &[f64]) -> String {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) => format!("{}:{}:{}", values.len(), first, last),
        _ => "0::".to_string(),
    }
}

/// Decides which entry, if any, leaves the cache when a new one is admitted.
pub trait EvictionPolicy: fmt::Debug {
    /// Called on every cache hit.
    fn touch(&mut self, key: &str);

    /// Called when `key` is inserted; returns a key to evict.
    fn admit(&mut self, key: &str) -> Option<String>;

    /// Called when the cache is cleared.
    fn reset(&mut self) {}
}

/// Never evicts. Memory grows with the number of distinct (tag, window) pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl EvictionPolicy for Unbounded {
    fn touch(&mut self, _key: &str) {}

    fn admit(&mut self, _key: &str) -> Option<String> {
        None
    }
}

/// Least-recently-used eviction with a fixed entry capacity (minimum 1).
#[derive(Debug, Clone)]
pub struct Lru {
    capacity: usize,
    order: VecDeque<String>,
}

impl Lru {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl EvictionPolicy for Lru {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn admit(&mut self, key: &str) -> Option<String> {
        self.order.push_back(key.to_string());
        if self.order.len() > self.capacity {
            self.order.pop_front()
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.order.clear();
    }
}

#[derive(Debug)]
pub struct IndicatorCache<V> {
    entries: HashMap<String, V>,
    policy: Box<dyn EvictionPolicy>,
    hits: u64,
    misses: u64,
}

impl<V> Default for IndicatorCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IndicatorCache<V> {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self::with_policy(Unbounded)
    }

    /// A cache holding at most `capacity` entries, evicting least recently used.
    pub fn lru(capacity: usize) -> Self {
        Self::with_policy(Lru::new(capacity))
    }

    pub fn with_policy<P: EvictionPolicy + 'static>(policy: P) -> Self {
        Self {
            entries: HashMap::new(),
            policy: Box::new(policy),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the value stored for `(key, fingerprint)`, calling `compute`
    /// only when there is none.
    pub fn memoize<F>(&mut self, key: &str, fingerprint: &str, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        let cache_key = format!("{}|{}", key, fingerprint);

        if self.entries.contains_key(&cache_key) {
            self.hits += 1;
            self.policy.touch(&cache_key);
            log::debug!("indicator cache hit: {}", cache_key);
            return &self.entries[&cache_key];
        }

        self.misses += 1;
        log::debug!("indicator cache miss: {}", cache_key);
        let value = compute();

        if let Some(victim) = self.policy.admit(&cache_key) {
            log::debug!("indicator cache evict: {}", victim);
            self.entries.remove(&victim);
        }

        self.entries.entry(cache_key).or_insert(value)
    }

    pub fn contains(&self, key: &str, fingerprint: &str) -> bool {
        self.entries
            .contains_key(&format!("{}|{}", key, fingerprint))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.policy.reset();
    }
}
