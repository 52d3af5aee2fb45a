//! Key-value persistence boundary for the event ledger.
//!
//! The ledger persists its state through the [`Storage`] trait: a flat
//! string-keyed JSON value store with get/set semantics. The host injects
//! whichever implementation fits its lifecycle:
//!
//! - [`MemoryStore`]: ephemeral, for tests and hosts that do their own
//!   persistence.
//! - [`JsonFileStore`]: a single pretty-printed JSON object on disk, loaded
//!   once at open and rewritten on every set.
//!
//! # Example
//!
//! ```
//! use kudos_tracker::storage::{MemoryStore, Storage};
//! use serde_json::json;
//!
//! let mut store = MemoryStore::new();
//! store.set("greeting", json!("hello")).unwrap();
//!
//! assert_eq!(store.get("greeting").unwrap(), Some(json!("hello")));
//! assert_eq!(store.get("missing").unwrap(), None);
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::StorageError;

/// A simple key-value JSON store.
///
/// Absent keys read as `None`; callers supply their own defaults.
pub trait Storage {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// In-memory store with no persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// File-backed store holding all keys in one JSON object.
///
/// The whole object is read at [`open`](Self::open) and rewritten on every
/// [`set`](Storage::set). State files are small (one event list and one
/// timestamp), so the rewrite stays cheap.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, Value>,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading existing state if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened state file");

        Ok(Self { path, entries })
    }

    /// Returns the default state file location, `~/.kudos/state.json`.
    ///
    /// Returns `None` when the home directory cannot be determined.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".kudos").join("state.json"))
    }

    /// Returns the path this store writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Storage for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.write()
    }
}
