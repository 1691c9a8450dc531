//! Client configuration.
//!
//! Loaded from `<config_dir>/todo-sync/config.toml` when present, then
//! overridden by `TODO_SYNC_BASE_URL` and `TODO_SYNC_STORAGE_DIR`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StoreError};
use crate::store::FileCredentialStore;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const BASE_URL_ENV: &str = "TODO_SYNC_BASE_URL";
pub const STORAGE_DIR_ENV: &str = "TODO_SYNC_STORAGE_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root, without the `/api` prefix.
    pub base_url: String,
    /// Directory holding the session token. `None` means the platform data
    /// directory.
    pub storage_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_dir: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("todo-sync").join("config.toml"))
    }

    /// Load the default file (if any) and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse `path`. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(dir) = lookup(STORAGE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
    }

    /// The file-backed credential store this configuration points at.
    pub fn credential_store(&self) -> Result<FileCredentialStore, StoreError> {
        match &self.storage_dir {
            Some(dir) => Ok(FileCredentialStore::new(dir)),
            None => FileCredentialStore::default_location(),
        }
    }
}
