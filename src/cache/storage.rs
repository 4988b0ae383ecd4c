use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// File extension used for stored values
const VALUE_EXTENSION: &str = "value";

/// The pair of keys a dataset is stored under.
///
/// Both keys are always written and read together; one without the other is
/// treated as an empty cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    pub data: String,
    pub time: String,
}

impl CacheKeys {
    pub fn new(data: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            time: time.into(),
        }
    }
}

/// A persistent string key-value store.
///
/// Values are opaque strings. There is no locking discipline across keys:
/// concurrent writers to the same key race and the last one wins.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; missing or unreadable keys yield `None`
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Returns true if the key existed
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Stores each key as a file in a cache directory
#[derive(Debug, Clone)]
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    /// Create a store in the default cache directory
    pub fn new() -> Result<Self> {
        let cache_dir = Self::default_cache_dir()?;
        Self::with_dir(cache_dir)
    }

    /// Create a store in a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir)
            .map_err(|e| Error::storage(&cache_dir.display().to_string(), e))?;
        Ok(Self { cache_dir })
    }

    /// Get the default cache directory
    pub fn default_cache_dir() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "userdash") {
            Ok(proj_dirs.cache_dir().to_path_buf())
        } else {
            // Fallback to home directory
            let home = std::env::var("HOME")
                .map_err(|_| Error::Config("HOME not set".to_string()))?;
            Ok(PathBuf::from(home).join(".cache").join("userdash"))
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Keys currently present in the store
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();

        if let Ok(entries) = fs::read_dir(&self.cache_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Ok(key) = urlencoding::decode(stem) {
                        keys.push(key.into_owned());
                    }
                }
            }
        }

        keys.sort();
        keys
    }

    /// Total bytes used by stored values
    pub fn size_bytes(&self) -> u64 {
        fs::read_dir(&self.cache_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Remove every stored value
    pub fn clear(&self) -> Result<()> {
        let dir = self.cache_dir.display().to_string();
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir).map_err(|e| Error::storage(&dir, e))?;
            fs::create_dir_all(&self.cache_dir).map_err(|e| Error::storage(&dir, e))?;
        }
        Ok(())
    }

    /// Path for a key. Keys are percent-encoded so any string maps to a
    /// single file inside the cache directory.
    fn value_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", urlencoding::encode(key), VALUE_EXTENSION))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.value_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                debug!(key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| Error::storage(key, e))?;
        fs::write(self.value_path(key), value).map_err(|e| Error::storage(key, e))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(key, e)),
        }
    }
}

/// In-process store, mostly useful for tests and short-lived callers
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic mid-insert can't leave a HashMap half-written, so the
        // poisoned map is still usable.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }
}
