//! Storage abstraction used by the app.
//!
//! This module provides a single trait `StorageBackend` and two concrete
//! implementations:
//!
//! - `FileStorage` — stores a single JSON file containing a map of string keys
//!   to string values. The file lives in a per-user configuration directory
//!   unless a path is given, and is read/written synchronously.
//! - `MemoryStorage` — keeps everything in memory, for `--ignore-persisted`
//!   sessions and tests.
//!
//! Structured data goes through the `save_json_backend`/`load_json_backend`
//! helpers, which use `serde` on top of the string primitives.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Simple generic storage backend trait.
///
/// Keys and values are UTF-8 strings.
pub trait StorageBackend: Send + Sync {
    /// Store a string value for a key.
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a string value for a key. Returns Ok(None) when key is missing.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a key (no-op if key does not exist).
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Serialize `value` as JSON under `key`.
pub fn save_json_backend<T: Serialize>(
    backend: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    match serde_json::to_string(value) {
        Ok(s) => backend.set_string(key, &s),
        Err(e) => Err(StorageError::Json(e.to_string())),
    }
}

/// Deserialize the JSON stored under `key`, `Ok(None)` when missing.
pub fn load_json_backend<T: DeserializeOwned>(
    backend: &dyn StorageBackend,
    key: &str,
) -> StorageResult<Option<T>> {
    match backend.get_string(key)? {
        Some(s) => match serde_json::from_str::<T>(&s) {
            Ok(v) => Ok(Some(v)),
            Err(e) => Err(StorageError::Json(e.to_string())),
        },
        None => Ok(None),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> StorageResult<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))
}

/// File-based storage: a single JSON file which is a map of key -> string value.
///
/// The file is read into memory on creation; every mutation flushes it back to
/// disk synchronously.
pub struct FileStorage {
    /// Path to the backing JSON file.
    path: PathBuf,
    /// In-memory copy of key -> value
    inner: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Default storage file path for the current user:
    /// - On Windows: %APPDATA%/PhotoRouteViewer/storage.json
    /// - Else: $HOME/.config/photo-route-viewer/storage.json
    pub fn default_storage_path() -> PathBuf {
        if cfg!(windows)
            && let Ok(appdata) = std::env::var("APPDATA")
        {
            return Path::new(&appdata)
                .join("PhotoRouteViewer")
                .join("storage.json");
        }

        if let Ok(home) = std::env::var("HOME") {
            return Path::new(&home)
                .join(".config")
                .join("photo-route-viewer")
                .join("storage.json");
        }

        Path::new(".").join("photo-route-viewer-storage.json")
    }

    pub fn new_with_path(path: Option<PathBuf>) -> StorageResult<Self> {
        let path = path.unwrap_or_else(Self::default_storage_path);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = fs::create_dir_all(parent)
        {
            return Err(StorageError::Io(format!(
                "Failed to create storage parent directory: {}",
                e
            )));
        }

        let mut map: HashMap<String, String> = HashMap::new();
        if path.exists() {
            let s = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read storage file: {}", e)))?;
            if !s.trim().is_empty() {
                map = serde_json::from_str(&s).map_err(|e| {
                    StorageError::Json(format!("Failed to parse storage JSON: {}", e))
                })?;
            }
        }

        tracing::debug!(
            "Opened storage {} ({} keys)",
            path.display(),
            map.len()
        );
        Ok(FileStorage {
            path,
            inner: Mutex::new(map),
        })
    }

    fn flush_locked(&self, locked: &HashMap<String, String>) -> StorageResult<()> {
        let s = serde_json::to_string_pretty(locked)
            .map_err(|e| StorageError::Json(e.to_string()))?;
        fs::write(&self.path, s).map_err(|e| StorageError::Io(format!("write failed: {}", e)))
    }
}

impl StorageBackend for FileStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = lock(&self.inner)?;
        guard.insert(key.to_string(), value.to_string());
        self.flush_locked(&guard)
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = lock(&self.inner)?;
        Ok(guard.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = lock(&self.inner)?;
        if guard.remove(key).is_some() {
            self.flush_locked(&guard)?;
        }
        Ok(())
    }
}

/// Volatile storage, lost when dropped.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        lock(&self.inner)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.inner)?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        lock(&self.inner)?.remove(key);
        Ok(())
    }
}

/// File storage at `path`, or at the per-user default location.
pub fn default_storage_backend(path: Option<PathBuf>) -> StorageResult<Box<dyn StorageBackend>> {
    Ok(Box::new(FileStorage::new_with_path(path)?))
}
