//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API server URL, the storage backend used for the
//! session, and the last used username.
//!
//! Configuration is stored at `~/.config/authdemo/config.json`. Environment
//! variables override the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "authdemo";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API base URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api/";

pub const ENV_SERVER_URL: &str = "AUTHDEMO_SERVER_URL";
pub const ENV_STORAGE: &str = "AUTHDEMO_STORAGE";
pub const ENV_USERNAME: &str = "AUTHDEMO_USERNAME";
pub const ENV_PASSWORD: &str = "AUTHDEMO_PASSWORD";

/// Where the session is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// JSON file in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Process memory only, forgotten on exit
    Memory,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageMode::File => "file",
            StorageMode::Keyring => "keyring",
            StorageMode::Memory => "memory",
        })
    }
}

impl FromStr for StorageMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageMode::File),
            "keyring" | "keychain" => Ok(StorageMode::Keyring),
            "memory" => Ok(StorageMode::Memory),
            other => Err(anyhow::anyhow!("Unknown storage mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub storage: StorageMode,
    #[serde(default)]
    pub last_username: Option<String>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            storage: StorageMode::default(),
            last_username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Location of the config file
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply `AUTHDEMO_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_SERVER_URL) {
            debug!(url = %url, "Server URL overridden from environment");
            self.server_url = url;
        }
        if let Some(raw) = lookup(ENV_STORAGE) {
            match raw.parse() {
                Ok(mode) => self.storage = mode,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_STORAGE),
            }
        }
        if let Some(user) = lookup(ENV_USERNAME) {
            self.last_username = Some(user);
        }
    }

    /// Open the configured storage backend
    pub fn open_storage(&self) -> Result<Arc<dyn KeyValueStore>> {
        let storage: Arc<dyn KeyValueStore> = match self.storage {
            StorageMode::File => {
                let dir = self.cache_dir()?;
                Arc::new(FileStore::open_or_empty(&dir))
            }
            StorageMode::Keyring => Arc::new(KeyringStore::new()),
            StorageMode::Memory => Arc::new(MemoryStore::new()),
        };
        debug!(mode = %self.storage, "Session storage opened");
        Ok(storage)
    }
}
