// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flat key-value persistence for the credential.
//!
//! The credential manager only sees [`KeyValueStore`]; the CLI uses a
//! [`FileStore`] and tests can substitute a [`MemoryStore`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;

/// Key-value pairs as loaded from or written to a store.
pub type Entries = BTreeMap<String, String>;

/// Persisted key names.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "KEY_ACCESS_TOKEN";
    pub const REFRESH_TOKEN: &str = "KEY_REFRESH_TOKEN";
    pub const TOKEN_TYPE: &str = "KEY_TOKEN_TYPE";
    pub const EXPIRY: &str = "KEY_EXPIRY";
}

/// Store-level I/O or format failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store: {0}")]
    Format(String),
}

/// A store that holds one flat set of entries, replaced wholesale on save.
pub trait KeyValueStore {
    /// Load all entries.
    fn load(&self) -> Result<Entries, StoreError>;

    /// Replace all entries with `entries`.
    fn save(&self, entries: &Entries) -> Result<(), StoreError>;
}
