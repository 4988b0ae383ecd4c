//! Settings for the `userdash` binary.
//!
//! Read from `config.json` in the platform config directory
//! (`~/.config/userdash/config.json` on Linux). Every field is optional;
//! command-line flags take precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cache::CacheKeys;
use crate::error::{Error, Result};

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;
pub const DEFAULT_DATA_KEY: &str = "users";
pub const DEFAULT_TIME_KEY: &str = "usersFetchedAt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// URL returning the full JSON array of users
    pub endpoint: Option<String>,
    pub rows_per_page: usize,
    pub data_key: String,
    pub time_key: String,
    /// Overrides the platform cache directory
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            data_key: DEFAULT_DATA_KEY.to_string(),
            time_key: DEFAULT_TIME_KEY.to_string(),
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, or defaults if there is no file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::storage(&path.display().to_string(), e))?;
        serde_json::from_str(&contents).map_err(|e| Error::parse("config file", e))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "userdash").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn keys(&self) -> CacheKeys {
        CacheKeys::new(&self.data_key, &self.time_key)
    }

    /// The endpoint to fetch from, or a config error naming how to set one
    pub fn require_endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "no endpoint configured; pass --endpoint or set \"endpoint\" in config.json"
                        .to_string(),
                )
            })
    }
}
