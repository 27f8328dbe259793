//! SQLite-backed key-value store.
//!
//! A single `kv` table holds every persisted blob. Multi-key writes run in
//! one transaction so the todo list and its id counter never diverge.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{data_dir, KvStore};
use crate::error::{Result, StorageError};

/// SQLite database holding the kv table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at `~/.config/pomotrack/pomotrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("pomotrack.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        debug!(path = %path.display(), "opened sqlite store");
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KvStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn save_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = SqliteStore::open_memory().unwrap();
        assert!(db.load("test").unwrap().is_none());
        db.save("test", "hello").unwrap();
        assert_eq!(db.load("test").unwrap().unwrap(), "hello");
        db.save("test", "again").unwrap();
        assert_eq!(db.load("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn save_all_is_transactional() {
        let db = SqliteStore::open_memory().unwrap();
        db.save_all(&[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(db.load("a").unwrap().as_deref(), Some("1"));
        assert_eq!(db.load("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        {
            let db = SqliteStore::open_at(&path).unwrap();
            db.save("k", "persisted").unwrap();
        }
        let db = SqliteStore::open_at(&path).unwrap();
        assert_eq!(db.load("k").unwrap().as_deref(), Some("persisted"));
    }
}
