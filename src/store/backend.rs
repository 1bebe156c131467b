//! Persistent option storage
//!
//! The store talks to storage through [`OptionBackend`]. Writes are per key
//! and last-writer-wins; there are no transactions.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::BackendError;

/// Configuration tier an option belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionScope {
    Site,
    Network,
}

impl OptionScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionScope::Site => "site",
            OptionScope::Network => "network",
        }
    }
}

impl fmt::Display for OptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value option storage shared across requests
pub trait OptionBackend: Send + Sync {
    /// Read one option; `Ok(None)` when it was never written
    fn get(&self, scope: OptionScope, key: &str) -> Result<Option<Value>, BackendError>;

    fn set(&self, scope: OptionScope, key: &str, value: Value) -> Result<(), BackendError>;

    /// Remove an option. Removing a missing key is not an error.
    fn delete(&self, scope: OptionScope, key: &str) -> Result<(), BackendError>;
}

/// In-process option storage
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<(OptionScope, String), Value>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an option without going through the store
    #[must_use]
    pub fn with(self, scope: OptionScope, key: &str, value: Value) -> Self {
        self.values.write().insert((scope, key.to_string()), value);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl OptionBackend for MemoryBackend {
    fn get(&self, scope: OptionScope, key: &str) -> Result<Option<Value>, BackendError> {
        Ok(self.values.read().get(&(scope, key.to_string())).cloned())
    }

    fn set(&self, scope: OptionScope, key: &str, value: Value) -> Result<(), BackendError> {
        self.values.write().insert((scope, key.to_string()), value);
        Ok(())
    }

    fn delete(&self, scope: OptionScope, key: &str) -> Result<(), BackendError> {
        self.values.write().remove(&(scope, key.to_string()));
        Ok(())
    }
}

/// Options persisted as one JSON document:
///
/// ```json
/// { "site": { "custom_domain": "https://cdn.test" }, "network": { "enabled": true } }
/// ```
///
/// The file is re-read on every call so separate processes see each other's
/// writes; a missing file reads as empty. Every write replaces the file with
/// an atomic rename, so readers never observe a partially written document.
///
/// Read-modify-write cycles are serialized between every backend opened on
/// the same path in this process. Writers in different processes are not
/// serialized: each write replaces the whole document, so two processes
/// writing at the same moment can drop each other's keys.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

/// One write lock per option file, shared by every backend in the process
static PATH_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    PATH_LOCKS.lock().entry(key).or_default().clone()
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            write_lock: lock_for(&path),
            path,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, BackendError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            other => Err(BackendError::Malformed(format!(
                "expected a JSON object at the top level, found {}",
                value_kind(&other)
            ))),
        }
    }

    /// Write the document to a sibling temp file, then rename it into place
    fn save(&self, document: &Map<String, Value>) -> Result<(), BackendError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut staged, document)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .map_err(|e| BackendError::Io(e.error))?;
        Ok(())
    }

    fn update<F>(&self, scope: OptionScope, apply: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let _guard = self.write_lock.lock();
        let mut document = self.load()?;
        let section = document
            .entry(scope.as_str())
            .or_insert_with(|| Value::Object(Map::new()));

        match section {
            Value::Object(options) => apply(options),
            other => {
                return Err(BackendError::Malformed(format!(
                    "section '{scope}' is {}, expected an object",
                    value_kind(other)
                )));
            }
        }

        self.save(&document)
    }
}

impl OptionBackend for JsonFileBackend {
    fn get(&self, scope: OptionScope, key: &str) -> Result<Option<Value>, BackendError> {
        let document = self.load()?;
        match document.get(scope.as_str()) {
            None => Ok(None),
            Some(Value::Object(options)) => Ok(options.get(key).cloned()),
            Some(other) => Err(BackendError::Malformed(format!(
                "section '{scope}' is {}, expected an object",
                value_kind(other)
            ))),
        }
    }

    fn set(&self, scope: OptionScope, key: &str, value: Value) -> Result<(), BackendError> {
        self.update(scope, |options| {
            options.insert(key.to_string(), value);
        })
    }

    fn delete(&self, scope: OptionScope, key: &str) -> Result<(), BackendError> {
        self.update(scope, |options| {
            options.shift_remove(key);
        })
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
