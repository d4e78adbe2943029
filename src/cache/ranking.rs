//! Two-tier memo of ranking results.
//!
//! Entries map `(normalized query, language)` to an ordered list of record
//! ids. Ids rather than records keep persisted entries small and immune to
//! record schema changes; callers resolve them through the live catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::{KeyValueStore, SEARCH_KEY_PREFIX};
use crate::core::{Language, ResultSource};
use crate::error::StoreError;
use crate::ranking::normalize_query;

/// Composite cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    language: Language,
}

impl CacheKey {
    /// Build a key; the query is normalized (trimmed, lower-cased)
    pub fn new(query: &str, language: Language) -> Self {
        Self {
            query: normalize_query(query),
            language,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Key in the persistent store. The language code never contains ':',
    /// so the query can be taken verbatim.
    pub fn storage_key(&self) -> String {
        format!("{}{}:{}", SEARCH_KEY_PREFIX, self.language.code(), self.query)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRanking {
    ids: Vec<u32>,
    cached_at: DateTime<Utc>,
}

/// A cache hit and the tier that served it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub ids: Vec<u32>,
    pub source: ResultSource,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub memory_hits: u64,
    pub persistent_hits: u64,
    pub misses: u64,
    pub store_failures: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.memory_hits + self.persistent_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// In-memory session tier backed by a persistent tier.
///
/// Writes to both tiers happen under the memory mutex, so a purge is never
/// interleaved with an insert. Every purge starts a new generation; an insert
/// computed in an older generation is discarded.
pub struct RankingCache {
    memory: Mutex<HashMap<CacheKey, Vec<u32>>>,
    persistent: Arc<dyn KeyValueStore>,
    generation: AtomicU64,
    memory_hits: AtomicU64,
    persistent_hits: AtomicU64,
    misses: AtomicU64,
    store_failures: AtomicU64,
}

impl RankingCache {
    pub fn new(persistent: Arc<dyn KeyValueStore>) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            persistent,
            generation: AtomicU64::new(0),
            memory_hits: AtomicU64::new(0),
            persistent_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            store_failures: AtomicU64::new(0),
        }
    }

    /// Current generation; take it before reading the data a ranking is
    /// computed from and pass it to [`RankingCache::insert_if_current`]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Memory tier first, then the persistent tier (promoting into memory)
    pub fn lookup(&self, key: &CacheKey) -> Option<CacheHit> {
        let generation = self.generation();
        let cached = self
            .memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        if let Some(ids) = cached {
            self.memory_hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Memory cache hit for '{}' [{}]", key.query, key.language);
            return Some(CacheHit {
                ids,
                source: ResultSource::MemoryCache,
            });
        }

        match self.read_persistent(key) {
            Some(ids) => {
                self.persistent_hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Persistent cache hit for '{}' [{}]", key.query, key.language);
                let mut memory = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
                if self.generation() == generation {
                    memory.insert(key.clone(), ids.clone());
                }
                Some(CacheHit {
                    ids,
                    source: ResultSource::PersistentCache,
                })
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache miss for '{}' [{}]", key.query, key.language);
                None
            }
        }
    }

    /// Populate both tiers
    pub fn insert(&self, key: &CacheKey, ids: &[u32]) {
        self.insert_if_current(key, ids, self.generation());
    }

    /// Populate both tiers unless a purge happened since `generation` was
    /// taken. Returns whether the entry was stored.
    pub fn insert_if_current(&self, key: &CacheKey, ids: &[u32], generation: u64) -> bool {
        let mut memory = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation() != generation {
            tracing::debug!("Discarding ranking for '{}' computed before a purge", key.query);
            return false;
        }
        memory.insert(key.clone(), ids.to_vec());

        let entry = PersistedRanking {
            ids: ids.to_vec(),
            cached_at: Utc::now(),
        };

        let written = serde_json::to_string(&entry)
            .map_err(StoreError::from)
            .and_then(|json| self.persistent.set(&key.storage_key(), &json));

        if let Err(e) = written {
            self.store_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "⚠️ Failed to persist ranking for '{}' to {}: {}",
                key.query,
                self.persistent.name(),
                e
            );
        }
        true
    }

    /// Drop every entry from both tiers
    pub fn purge(&self) {
        let mut memory = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        memory.clear();

        match self.persistent.remove_prefix(SEARCH_KEY_PREFIX) {
            Ok(removed) => tracing::debug!("Purged {} persisted rankings", removed),
            Err(e) => {
                self.store_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("⚠️ Failed to purge persisted rankings: {}", e);
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self
                .memory
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }

    fn read_persistent(&self, key: &CacheKey) -> Option<Vec<u32>> {
        let raw = match self.persistent.get(&key.storage_key()) {
            Ok(raw) => raw?,
            Err(e) => {
                self.store_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "⚠️ {} read failed for '{}', treating as miss: {}",
                    self.persistent.name(),
                    key.query,
                    e
                );
                return None;
            }
        };

        match serde_json::from_str::<PersistedRanking>(&raw) {
            Ok(entry) => Some(entry.ids),
            Err(e) => {
                tracing::warn!("⚠️ Discarding unreadable ranking for '{}': {}", key.query, e);
                None
            }
        }
    }
}
