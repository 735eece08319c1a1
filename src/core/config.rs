//! Persisted monitor configuration.
//!
//! A single user-toggleable flag, stored as JSON under the platform config
//! directory. Loading tolerates a missing, empty or corrupt file (falls back
//! to defaults); saving creates the parent directory on demand.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::paths;
use super::store::FileStore;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Whether background monitoring is enabled.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        // Monitoring starts disabled until the user toggles it on.
        Self { enabled: false }
    }
}

impl MonitorConfig {
    /// Load from the default config path.
    pub fn load(store: &dyn FileStore) -> Result<Self> {
        let path = paths::config_path()?;
        Ok(Self::load_from(store, &path))
    }

    /// Load from an explicit path, falling back to defaults on any failure.
    pub fn load_from(store: &dyn FileStore, path: &Path) -> Self {
        if !store.exists(path) {
            return Self::default();
        }

        match store.read(path) {
            Ok(data) if data.is_empty() => Self::default(),
            // A corrupt file is treated like a missing one (this can happen
            // when the config format changes).
            Ok(data) => serde_json::from_slice(&data).unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save to the default config path.
    pub fn save(&self, store: &dyn FileStore) -> Result<()> {
        let path = paths::config_path()?;
        self.save_to(store, &path)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, store: &dyn FileStore, path: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        store.write(path, &data)?;
        Ok(())
    }
}
