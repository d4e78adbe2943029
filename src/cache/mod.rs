pub mod memory;
pub mod ranking;
pub mod sqlite;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use ranking::{CacheHit, CacheKey, CacheStats, RankingCache};
pub use sqlite::SqliteStore;

/// Key holding the persisted, validated catalog payload
pub const DATASET_KEY: &str = "pokedex:dataset";

/// Prefix of every persisted ranking entry
pub const SEARCH_KEY_PREFIX: &str = "pokedex:search:";

/// Preference keys
pub const PREF_LANGUAGE_KEY: &str = "pokedex:pref:language";
pub const PREF_SORT_KEY: &str = "pokedex:pref:sort";
pub const PREF_THEME_KEY: &str = "pokedex:pref:theme";

/// Trait for persistent key-value store implementations.
///
/// Callers must tolerate every method failing: a broken store degrades to a
/// cache miss or a default preference, never to a crash.
pub trait KeyValueStore: Send + Sync {
    /// Get value by key
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a single key
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key starting with `prefix`, returning how many were removed
    fn remove_prefix(&self, prefix: &str) -> Result<u64, StoreError>;

    /// Get store name for logging
    fn name(&self) -> &str;
}
