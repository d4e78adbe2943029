use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

use crate::cache::KeyValueStore;
use crate::error::StoreError;

/// SQLite-backed persistent tier.
///
/// ```sql
/// CREATE TABLE kv_store (
///     key TEXT PRIMARY KEY,
///     value TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store. `":memory:"` gives a throwaway database.
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }

    /// Number of stored keys
    pub fn len(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// When `key` was last written
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn remove_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        // substr() instead of LIKE: prefixes may contain '%' or '_'
        let deleted = conn.execute(
            "DELETE FROM kv_store WHERE substr(key, 1, length(?1)) = ?1",
            params![prefix],
        )?;
        Ok(deleted as u64)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_create() {
        let store = SqliteStore::new(":memory:").unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_store_set_and_get() {
        let store = SqliteStore::new(":memory:").unwrap();

        store.set("pokedex:pref:theme", "dark").unwrap();
        assert_eq!(store.get("pokedex:pref:theme").unwrap().as_deref(), Some("dark"));
        assert!(store.updated_at("pokedex:pref:theme").unwrap().is_some());

        store.set("pokedex:pref:theme", "light").unwrap();
        assert_eq!(store.get("pokedex:pref:theme").unwrap().as_deref(), Some("light"));
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_store_remove() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn test_store_remove_prefix() {
        let store = SqliteStore::new(":memory:").unwrap();

        store.set("pokedex:search:en:pika", "[]").unwrap();
        store.set("pokedex:search:jp:pika", "[]").unwrap();
        store.set("pokedex:pref:sort", "id-asc").unwrap();
        store.set("pokedex:search_other", "x").unwrap();

        let deleted = store.remove_prefix("pokedex:search:").unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.len().unwrap(), 2);
        assert!(store.get("pokedex:pref:sort").unwrap().is_some());
    }

    #[test]
    fn test_store_prefix_with_wildcards() {
        let store = SqliteStore::new(":memory:").unwrap();
        store.set("a%b:1", "x").unwrap();
        store.set("axb:1", "x").unwrap();

        assert_eq!(store.remove_prefix("a%b").unwrap(), 1);
        assert!(store.get("axb:1").unwrap().is_some());
    }

    #[test]
    fn test_store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokedex.db");
        let path = path.to_str().unwrap();

        SqliteStore::new(path).unwrap().set("k", "v").unwrap();

        let reopened = SqliteStore::new(path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }
}
