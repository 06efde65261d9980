// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dotenv-format file store.
//!
//! One `KEY=VALUE` pair per line. Values made only of token-safe characters
//! are written bare; anything else is quoted so that `dotenvy` reads it back
//! verbatim.

use super::{Entries, KeyValueStore, StoreError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default cache file, relative to the working directory.
pub const DEFAULT_CACHE_FILE: &str = ".token-source.cache";

/// [`KeyValueStore`] backed by a single dotenv-format file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self) -> Result<Entries, StoreError> {
        let iter = dotenvy::from_path_iter(&self.path).map_err(map_dotenv_error)?;

        let mut entries = Entries::new();
        for item in iter {
            let (key, value) = item.map_err(map_dotenv_error)?;
            entries.insert(key, value);
        }

        tracing::debug!(path = %self.path.display(), keys = entries.len(), "Loaded store");
        Ok(entries)
    }

    fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        let mut body = String::new();
        for (key, value) in entries {
            if !is_valid_key(key) {
                return Err(StoreError::Format(format!("invalid key {:?}", key)));
            }
            body.push_str(key);
            body.push('=');
            body.push_str(&quote_value(value));
            body.push('\n');
        }

        // Write beside the target and rename, so a failed write never
        // leaves a truncated cache behind.
        let tmp_path = self.path.with_extension("tmp");
        if let Err(e) = write_then_rename(&tmp_path, &self.path, body.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), keys = entries.len(), "Saved store");
        Ok(())
    }
}

fn write_then_rename(tmp_path: &Path, path: &Path, body: &[u8]) -> std::io::Result<()> {
    {
        let mut file = open_private(tmp_path)?;
        file.write_all(body)?;
        file.sync_all()?;
    }
    fs::rename(tmp_path, path)
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

fn map_dotenv_error(err: dotenvy::Error) -> StoreError {
    match err {
        dotenvy::Error::Io(e) => StoreError::Io(e),
        other => StoreError::Format(other.to_string()),
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn quote_value(value: &str) -> String {
    let bare = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '~' | '/' | '+'));
    if bare {
        return value.to_string();
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("ya29.a0AfH6SM-x_y/z+1"), "ya29.a0AfH6SM-x_y/z+1");
        assert_eq!(quote_value("1646492400"), "1646492400");
        assert_eq!(quote_value("abc=="), "'abc=='");
        assert_eq!(quote_value("it's $HOME"), "\"it's \\$HOME\"");
        assert_eq!(quote_value(""), "");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.cache"));
        assert!(matches!(store.load(), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_save_then_load_preserves_awkward_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache"));

        let mut entries = Entries::new();
        entries.insert("PLAIN".to_string(), "token.value-1".to_string());
        entries.insert("PADDED".to_string(), "abc==".to_string());
        entries.insert("SPACED".to_string(), "Bearer token".to_string());
        entries.insert("MIXED".to_string(), "it's \"$x\"".to_string());
        store.save(&entries).unwrap();

        assert_eq!(store.load().unwrap(), entries);
    }

    #[test]
    fn test_save_rejects_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache"));

        let mut entries = Entries::new();
        entries.insert("BAD KEY".to_string(), "v".to_string());
        assert!(matches!(store.save(&entries), Err(StoreError::Format(_))));
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache");
        // A non-empty directory at the target makes the final rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let mut entries = Entries::new();
        entries.insert("KEY".to_string(), "value".to_string());
        let err = FileStore::new(&path).save(&entries).unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
        assert!(!path.with_extension("tmp").exists());
        assert!(path.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache");
        FileStore::new(&path).save(&Entries::new()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
