// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store, used by tests and dry runs.

use super::{Entries, KeyValueStore, StoreError};
use std::sync::{Arc, Mutex};

/// In-memory [`KeyValueStore`]. Clones share the same contents.
///
/// A store created with [`MemoryStore::unreadable`] fails every load, which
/// stands in for a missing cache file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Option<Entries>>>,
}

impl MemoryStore {
    /// Empty but readable store.
    pub fn new() -> Self {
        Self::with_entries(Entries::new())
    }

    /// Store pre-populated with `entries`.
    pub fn with_entries(entries: Entries) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Some(entries))),
        }
    }

    /// Store that has never been written; loading fails until the first save.
    pub fn unreadable() -> Self {
        Self::default()
    }

    /// Snapshot of the current contents, if any were ever written.
    pub fn snapshot(&self) -> Option<Entries> {
        self.entries.lock().ok().and_then(|guard| guard.clone())
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self) -> Result<Entries, StoreError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StoreError::Format(format!("poisoned lock: {}", e)))?;
        guard.clone().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "memory store never written",
            ))
        })
    }

    fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StoreError::Format(format!("poisoned lock: {}", e)))?;
        *guard = Some(entries.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_until_saved() {
        let store = MemoryStore::unreadable();
        assert!(store.load().is_err());

        let mut entries = Entries::new();
        entries.insert("A".to_string(), "1".to_string());
        store.save(&entries).unwrap();

        assert_eq!(store.load().unwrap(), entries);
    }

    #[test]
    fn test_save_replaces_contents() {
        let mut first = Entries::new();
        first.insert("OLD".to_string(), "x".to_string());
        let store = MemoryStore::with_entries(first);

        let mut second = Entries::new();
        second.insert("NEW".to_string(), "y".to_string());
        store.clone().save(&second).unwrap();

        assert_eq!(store.snapshot(), Some(second));
    }
}
