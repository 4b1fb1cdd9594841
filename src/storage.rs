//! Durable key-value storage for serialized blobs.
//!
//! `FileStorage` keeps one JSON file per key under a root directory. Every
//! `set` is a scoped write: open a temp sibling, write the whole blob, flush,
//! close, then rename over the target. Nothing is buffered between calls.
//!
//! `MemoryStorage` backs tests and can be told to fail writes.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("storage i/o failed for key '{key}': {source}")]
  Io {
    key: String,
    #[source]
    source: io::Error,
  },
  #[error("storage unavailable")]
  Unavailable,
}

pub trait KeyValueStorage: Send + Sync {
  /// Blob stored under `key`, or `None` if nothing was ever written.
  fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
  /// Replace the blob under `key` with `value`.
  fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
  root: PathBuf,
}

impl FileStorage {
  /// Open (creating if needed) a storage directory.
  pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
    let root = root.into();
    fs::create_dir_all(&root).map_err(|source| StorageError::Io {
      key: root.display().to_string(),
      source,
    })?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn path_for(&self, key: &str) -> PathBuf {
    // Keys are fixed identifiers; anything outside [A-Za-z0-9_-] is replaced
    // so a key can never escape the root.
    let safe: String = key
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
      .collect();
    self.root.join(format!("{safe}.json"))
  }
}

impl KeyValueStorage for FileStorage {
  #[instrument(level = "debug", skip(self))]
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(self.path_for(key)) {
      Ok(s) => Ok(Some(s)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
    }
  }

  /// Blocking file I/O. Callers hold the progress lock across this call;
  /// blobs are a few KB, so it stays on the async worker thread.
  #[instrument(level = "debug", skip(self, value), fields(bytes = value.len()))]
  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let target = self.path_for(key);
    let tmp = target.with_extension("json.tmp");
    let io_err = |source| StorageError::Io { key: key.to_string(), source };

    {
      let mut file = fs::File::create(&tmp).map_err(io_err)?;
      file.write_all(value.as_bytes()).map_err(io_err)?;
      file.sync_all().map_err(io_err)?;
    }
    fs::rename(&tmp, &target).map_err(io_err)?;
    debug!(target: "debate_tutor", path = %target.display(), "Blob written");
    Ok(())
  }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
  blobs: Mutex<HashMap<String, String>>,
  fail_writes: AtomicBool,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every subsequent `set` fail with `Unavailable`.
  #[cfg(test)]
  pub fn set_fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  fn blobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl KeyValueStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.blobs().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(StorageError::Unavailable);
    }
    self.blobs().insert(key.to_string(), value.to_string());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_storage_missing_key_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    assert_eq!(storage.get("debate-platform-progress").unwrap(), None);
  }

  #[test]
  fn file_storage_overwrites_whole_blob() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("k", "first, longer value").unwrap();
    storage.set("k", "second").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
    assert!(!dir.path().join("k.json.tmp").exists());
  }

  #[test]
  fn file_storage_keys_stay_inside_root() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("../escape", "x").unwrap();
    assert!(dir.path().join("___escape.json").exists());
    assert_eq!(storage.get("../escape").unwrap().as_deref(), Some("x"));
    assert!(!dir.path().parent().unwrap().join("escape.json").exists());
  }

  #[test]
  fn memory_storage_can_fail_writes() {
    let storage = MemoryStorage::new();
    storage.set("k", "v").unwrap();
    storage.set_fail_writes(true);
    assert!(matches!(storage.set("k", "w"), Err(StorageError::Unavailable)));
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
  }
}
