//! Compiled pattern cache with TTL expiry
//!
//! Maps a pattern set to its finished, minimized automaton.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::automaton::Automaton;
use crate::error::Result;
use crate::settings::CacheSettings;

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry {
    automaton: Automaton,
    created_at: Instant,
}

impl CacheEntry {
    fn new(automaton: Automaton) -> Self {
        Self {
            automaton,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Statistics about cache performance
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of expired entries encountered
    pub expirations: usize,
    /// Total number of entries in cache
    pub entries: usize,
    /// Configured capacity
    pub max_entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe cache of compiled automata keyed by pattern set
///
/// Clones share the same underlying storage.
#[derive(Debug, Clone)]
pub struct AutomatonCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
    stats: Arc<DashMap<&'static str, usize>>,
}

impl AutomatonCache {
    /// Creates a cache holding at most `capacity` entries for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
            ttl,
            stats: Arc::new(DashMap::new()),
        }
    }

    /// Builds a cache from settings, or `None` when caching is disabled
    pub fn from_settings(settings: &CacheSettings) -> Option<Self> {
        settings
            .enabled
            .then(|| Self::new(settings.size, settings.ttl()))
    }

    /// Cache key for a pattern set compiled under a state ceiling
    ///
    /// Order and duplicates do not change the compiled language, so the key
    /// is built from the sorted, deduplicated patterns. Each pattern is
    /// length-prefixed to keep the encoding unambiguous. The ceiling is part
    /// of the key: a set that fits one ceiling may exceed another.
    pub fn key_for<S: AsRef<str>>(patterns: &[S], max_states: usize) -> String {
        let mut sorted: Vec<&str> = patterns.iter().map(|p| p.as_ref()).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut key = max_states.to_string();
        key.push('/');
        for pattern in sorted {
            key.push_str(&pattern.len().to_string());
            key.push(':');
            key.push_str(pattern);
        }
        key
    }

    /// Returns the cached automaton for `key`, if present and fresh
    pub fn get(&self, key: &str) -> Option<Automaton> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired(self.ttl) {
                drop(entry);
                self.entries.remove(key);
                self.increment_stat("expirations");
                self.increment_stat("misses");
                return None;
            }

            self.increment_stat("hits");
            return Some(entry.automaton.clone());
        }

        self.increment_stat("misses");
        None
    }

    /// Stores an automaton, evicting entries when at capacity
    pub fn insert(&self, key: String, automaton: Automaton) {
        if self.entries.len() >= self.capacity {
            self.cleanup_expired();
        }
        if self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(key, CacheEntry::new(automaton));
    }

    /// Returns the cached automaton or builds and caches it
    ///
    /// A failed build caches nothing.
    pub fn get_or_try_insert_with<F>(&self, key: String, build: F) -> Result<Automaton>
    where
        F: FnOnce() -> Result<Automaton>,
    {
        if let Some(automaton) = self.get(&key) {
            debug!("Pattern cache hit for [{}]", key);
            return Ok(automaton);
        }

        debug!("Pattern cache miss for [{}]", key);
        let automaton = build()?;
        self.insert(key, automaton.clone());
        Ok(automaton)
    }

    /// Clears all entries and statistics
    pub fn clear(&self) {
        self.entries.clear();
        self.stats.clear();
    }

    /// Removes expired entries
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
    }

    /// Returns cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            expirations: self.get_stat("expirations"),
            entries: self.entries.len(),
            max_entries: self.capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops roughly a tenth of the entries (at least one)
    fn evict(&self) {
        let to_remove = (self.capacity / 10).max(1);
        let mut removed = 0;

        self.entries.retain(|_, _| {
            if removed < to_remove {
                removed += 1;
                false
            } else {
                true
            }
        });
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}
