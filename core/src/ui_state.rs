//! Best-effort persistence of UI state (grid layout, filters, page size).
//!
//! Values are JSON under fixed keys. Nothing here ever fails: read, write and
//! parse problems are logged and the caller gets its default back.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod keys {
    pub const TODO_LIST_PAGE_SIZE: &str = "todoList_pageSize";
    pub const TODO_LIST_COLUMN_STATE: &str = "todoList_columnState";
    pub const TODO_LIST_FILTER_MODEL: &str = "todoList_filterModel";
    pub const TODO_LIST_SORT_MODEL: &str = "todoList_sortModel";

    pub const PROJECT_MANAGEMENT_PAGE_SIZE: &str = "projectManagement_pageSize";
    pub const PROJECT_MANAGEMENT_COLUMN_STATE: &str = "projectManagement_columnState";
    pub const PROJECT_MANAGEMENT_FILTER_MODEL: &str = "projectManagement_filterModel";

    pub const KANBAN_PROJECT_MODE: &str = "kanban_projectMode";
    pub const KANBAN_PROJECT_ID: &str = "kanban_projectId";

    pub const APP_CURRENT_USER: &str = "app_currentUser";
    pub const APP_CURRENT_VIEW: &str = "app_currentView";
}

pub mod grid {
    use super::{load, KeyValueStore};

    pub const PAGE_SIZE_OPTIONS: [u32; 4] = [25, 50, 100, 200];
    pub const DEFAULT_PAGE_SIZE: u32 = 50;

    /// Stored page size, or the default when missing or not one of the options.
    pub fn load_page_size(store: &dyn KeyValueStore, key: &str) -> u32 {
        let size = load(store, key, DEFAULT_PAGE_SIZE);
        if PAGE_SIZE_OPTIONS.contains(&size) {
            size
        } else {
            DEFAULT_PAGE_SIZE
        }
    }
}

/// Raw string storage under string keys.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            tracing::warn!(target: "ui_state", key, error = %e, "failed to read stored value");
            return default;
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(target: "ui_state", key, error = %e, "stored value is not valid JSON");
        default
    })
}

/// `None` removes the key.
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: Option<&T>) {
    let Some(value) = value else {
        remove(store, key);
        return;
    };
    let serialized = match serde_json::to_string(value) {
        Ok(serialized) => serialized,
        Err(e) => {
            tracing::warn!(target: "ui_state", key, error = %e, "failed to serialize value");
            return;
        }
    };
    if let Err(e) = store.write(key, &serialized) {
        tracing::warn!(target: "ui_state", key, error = %e, "failed to write value");
    }
}

pub fn remove(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        tracing::warn!(target: "ui_state", key, error = %e, "failed to remove value");
    }
}
