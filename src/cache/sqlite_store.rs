//! SQLite-backed durable store.
//! A single `kv_store` table stands in for browser local storage so cache
//! blobs and search history survive process restarts.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::clock::now_unix_ms;
use super::store::{DurableStore, StoreError};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the SQLite store at the given path.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self::init(conn)?;
        info!(path = %db_path.display(), "SQLite store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl DurableStore for SqliteStore {
    fn read(&self, key: &str) -> Option<String> {
        let conn = self.conn.lock();
        match conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, key, "SQLite store read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)",
            params![key, value, now_unix_ms()],
        )?;
        debug!(key, bytes = value.len(), "SQLite store write");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_round_trip_and_remove() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.read("searchHistory"), None);

        store.write("searchHistory", "[]").unwrap();
        store.write("searchHistory", "[1]").unwrap();
        assert_eq!(store.read("searchHistory").as_deref(), Some("[1]"));

        store.remove("searchHistory").unwrap();
        assert_eq!(store.read("searchHistory"), None);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.write("k", "v").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.read("k").as_deref(), Some("v"));
    }
}
