//! Task list store.
//!
//! An ordered todo list, newest first. Each mutation writes the list and the
//! id counter in one [`KvStore::save_all`] call before the in-memory copy is
//! replaced, so memory never runs ahead of storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::storage::{load_or_default, KvStore, NEXT_TODO_ID_KEY, TODOS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Durable todo list bound to a [`KvStore`].
pub struct TaskList<S> {
    store: S,
    items: Vec<TodoItem>,
    next_id: u64,
}

impl<S: KvStore> TaskList<S> {
    /// Load the list and its counter, starting empty if nothing usable is there.
    ///
    /// The counter is raised past the largest stored id when it is missing,
    /// unreadable, or stale, so ids stay unique.
    pub fn load(store: S) -> Self {
        let items: Vec<TodoItem> = load_or_default(&store, TODOS_KEY);
        let stored: Option<u64> = load_or_default(&store, NEXT_TODO_ID_KEY);
        let floor = items.iter().map(|t| t.id).max().unwrap_or(0).saturating_add(1);
        let next_id = match stored {
            Some(n) if n >= floor => n,
            Some(n) => {
                warn!(stored = n, floor, "todo id counter behind stored items; raising it");
                floor
            }
            None => floor,
        };
        Self {
            store,
            items,
            next_id,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Items, newest first.
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&TodoItem> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|t| !t.completed).count()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add a task at the top of the list.
    ///
    /// Returns `Ok(None)` without touching anything if `text` is blank.
    ///
    /// # Errors
    /// Fails with [`CoreError::IdsExhausted`] once the counter reaches
    /// `u64::MAX`, or with the storage error if the write fails.
    pub fn add(&mut self, text: &str) -> Result<Option<TodoItem>> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring blank task");
            return Ok(None);
        }
        // u64::MAX is never handed out; a saturated floor may already own it.
        if self.next_id == u64::MAX {
            warn!("todo id counter exhausted");
            return Err(CoreError::IdsExhausted);
        }
        let item = TodoItem {
            id: self.next_id,
            text: text.to_string(),
            completed: false,
            created_at: Utc::now(),
        };
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(item.clone());
        items.extend(self.items.iter().cloned());
        self.commit(items, self.next_id + 1)?;
        debug!(id = item.id, "task added");
        Ok(Some(item))
    }

    /// Delete a task. Returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let items = self.items.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(items, self.next_id)?;
        debug!(id, "task removed");
        Ok(true)
    }

    /// Flip the completed flag. Returns the new flag, or `None` if no such task.
    pub fn toggle_complete(&mut self, id: u64) -> Result<Option<bool>> {
        let mut items = self.items.clone();
        let Some(item) = items.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        item.completed = !item.completed;
        let completed = item.completed;
        self.commit(items, self.next_id)?;
        debug!(id, completed, "task toggled");
        Ok(Some(completed))
    }

    /// Replace a task's text. Blank text or an unknown id leaves the list as is.
    pub fn edit(&mut self, id: u64, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let mut items = self.items.clone();
        let Some(item) = items.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        item.text = text.to_string();
        self.commit(items, self.next_id)?;
        debug!(id, "task edited");
        Ok(true)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn commit(&mut self, items: Vec<TodoItem>, next_id: u64) -> Result<()> {
        let items_json = serde_json::to_string(&items)?;
        let next_json = next_id.to_string();
        self.store.save_all(&[
            (TODOS_KEY, items_json.as_str()),
            (NEXT_TODO_ID_KEY, next_json.as_str()),
        ])?;
        self.items = items;
        self.next_id = next_id;
        Ok(())
    }
}
