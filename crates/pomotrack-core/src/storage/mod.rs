//! Persistence adapter.
//!
//! Every durable piece of state is a JSON blob under a fixed key in a
//! [`KvStore`]. The store itself does no validation: callers decide what a
//! missing or unreadable value means via [`load_or_default`].

mod config;
mod memory;
mod sqlite;

pub use config::{AlertsConfig, Config, TimerConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Result, StorageError};

/// Key holding the serialized [`ProgressLedger`](crate::ledger::ProgressLedger).
pub const PROGRESS_KEY: &str = "progress_ledger";
/// Key holding the serialized todo list, newest first.
pub const TODOS_KEY: &str = "todo_items";
/// Key holding the next todo id counter.
pub const NEXT_TODO_ID_KEY: &str = "next_todo_id";

/// Durable string key-value store.
pub trait KvStore {
    /// Read a value. `Ok(None)` when the key was never written.
    fn load(&self, key: &str) -> Result<Option<String>>;

    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Write several keys so that readers see all of them or none.
    fn save_all(&self, entries: &[(&str, &str)]) -> Result<()>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }

    fn save_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        (**self).save_all(entries)
    }
}

impl<S: KvStore + ?Sized> KvStore for std::rc::Rc<S> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }

    fn save_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        (**self).save_all(entries)
    }
}

/// Decode the value under `key`, or fall back to `T::default()`.
///
/// Absent keys are the first-run case and fall back silently. Corrupt
/// content and backend read failures are logged and also fall back, so a
/// damaged store never blocks startup.
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KvStore + ?Sized,
{
    match store.load(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding malformed persisted value");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted value");
            T::default()
        }
    }
}

/// Returns `~/.config/pomotrack[-dev]/` based on POMOTRACK_ENV.
///
/// Set POMOTRACK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomotrack-dev")
    } else {
        base_dir.join("pomotrack")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
