//! Persisted user preferences and the layout state built on them

use crate::core::error::{ConsoleError, ConsoleResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Key/value store of user preferences
pub trait PreferencesStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value) -> ConsoleResult<()>;

    /// Remove a key, returning its previous value
    fn remove(&self, key: &str) -> ConsoleResult<Option<Value>>;
}

type Entries = IndexMap<String, Value>;

fn lock_error(e: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::Internal(format!("Failed to acquire preferences lock: {}", e))
}

/// Preferences kept for the lifetime of the process
#[derive(Default)]
pub struct InMemoryPreferences {
    entries: RwLock<Entries>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesStore for InMemoryPreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> ConsoleResult<()> {
        self.entries
            .write()
            .map_err(lock_error)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> ConsoleResult<Option<Value>> {
        Ok(self.entries.write().map_err(lock_error)?.shift_remove(key))
    }
}

/// Preferences persisted to a YAML file
///
/// The whole file is rewritten on every change. A missing file reads as
/// empty preferences.
pub struct FilePreferences {
    path: PathBuf,
    entries: RwLock<Entries>,
}

impl FilePreferences {
    pub fn open(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Entries::new(),
            Ok(content) => serde_yaml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), count = entries.len(), "preferences loaded");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> ConsoleResult<()> {
        let content = serde_yaml::to_string(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferencesStore for FilePreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().ok()?.get(key).cloned()
    }

    /// The file is written first; memory only changes once it succeeds
    fn set(&self, key: &str, value: Value) -> ConsoleResult<()> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value);
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> ConsoleResult<Option<Value>> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        if !entries.contains_key(key) {
            return Ok(None);
        }
        let mut updated = entries.clone();
        let previous = updated.shift_remove(key);
        self.persist(&updated)?;
        *entries = updated;
        Ok(previous)
    }
}

/// Layout state of the console shell
#[derive(Clone)]
pub struct Layout {
    store: Arc<dyn PreferencesStore>,
}

impl Layout {
    /// Preference key of the side navigation state
    pub const SIDENAV_OPEN: &'static str = "layout.sidenav_open";

    pub fn new(store: Arc<dyn PreferencesStore>) -> Self {
        Self { store }
    }

    /// Side navigation is open unless the user closed it
    pub fn sidenav_open(&self) -> bool {
        self.store
            .get(Self::SIDENAV_OPEN)
            .and_then(|value| value.as_bool())
            .unwrap_or(true)
    }

    pub fn set_sidenav_open(&self, open: bool) -> ConsoleResult<()> {
        self.store.set(Self::SIDENAV_OPEN, Value::Bool(open))
    }

    /// Flip the side navigation, returning the new state
    pub fn toggle_sidenav(&self) -> ConsoleResult<bool> {
        let open = !self.sidenav_open();
        self.set_sidenav_open(open)?;
        Ok(open)
    }
}
