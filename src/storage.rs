//! Key-value storage backends
//!
//! The checklist only needs string keys and string values, the same contract
//! as browser LocalStorage. Backends:
//! - `MemoryStore`: in-memory, with switchable failure modes for tests
//! - `JsonFileStore`: a JSON object on disk (native only)
//! - `platform::web::LocalStorage`: `window.localStorage` (wasm only)

use std::collections::BTreeMap;

use thiserror::Error;

/// Failure reading or writing the persisted store
#[derive(Debug, Error)]
pub enum StorageError {
    /// No storage backend is reachable (private mode, sandboxed iframe, ...)
    #[error("storage is unavailable")]
    Unavailable,

    /// Backend refused the write (quota exceeded, security error)
    #[error("storage rejected write to '{key}': {message}")]
    WriteRejected { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage
pub trait KeyValueStore {
    /// Read a value; missing keys and unreadable storage both yield `None`
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// How a `MemoryStore` misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    None,
    /// Every read returns `None`, every write fails with `Unavailable`
    Unavailable,
    /// Reads work, writes fail as if over quota
    RejectWrites,
    /// Writes to this one key fail
    RejectKey(&'static str),
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    failure: FailureMode,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            failure: FailureMode::None,
        }
    }

    pub fn set_failure_mode(&mut self, failure: FailureMode) {
        self.failure = failure;
    }

    /// Raw contents, ignoring failure mode
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    fn check_write(&self, key: &str) -> Result<(), StorageError> {
        match self.failure {
            FailureMode::None => Ok(()),
            FailureMode::Unavailable => Err(StorageError::Unavailable),
            FailureMode::RejectWrites => Err(StorageError::WriteRejected {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            }),
            FailureMode::RejectKey(bad) if bad == key => Err(StorageError::WriteRejected {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            }),
            FailureMode::RejectKey(_) => Ok(()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        if self.failure == FailureMode::Unavailable {
            return None;
        }
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_write(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object file holding all keys (native only)
///
/// The whole file is rewritten on every `set`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
    entries: BTreeMap<String, String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    /// Open a store file; a missing or corrupt file starts empty
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Ignoring corrupt store file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Cannot read store file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // Keep memory in step with disk
            match previous {
                Some(v) => self.entries.insert(key.to_string(), v),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if let Some(previous) = self.entries.remove(key) {
            if let Err(e) = self.flush() {
                self.entries.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_memory_store_unavailable() {
        let mut store = MemoryStore::with_entries([("k", "v")]);
        store.set_failure_mode(FailureMode::Unavailable);
        assert_eq!(store.get("k"), None);
        assert!(matches!(store.set("k", "w"), Err(StorageError::Unavailable)));
        assert_eq!(store.entries().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_memory_store_reject_single_key() {
        let mut store = MemoryStore::new();
        store.set_failure_mode(FailureMode::RejectKey("bad"));
        assert!(store.set("good", "1").is_ok());
        let err = store.set("bad", "1").unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_json_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = JsonFileStore::open(&path);
        store.set("gcc_notes", "hello").unwrap();
        drop(store);

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("gcc_notes").as_deref(), Some("hello"));
    }

    #[test]
    fn test_json_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("gcc_notes"), None);
    }

    #[test]
    fn test_json_file_store_write_failure_keeps_memory_consistent() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist, so every flush fails
        let path = dir.path().join("missing").join("store.json");

        let mut store = JsonFileStore::open(&path);
        assert!(matches!(store.set("k", "v"), Err(StorageError::Io(_))));
        assert_eq!(store.get("k"), None);
    }
}
