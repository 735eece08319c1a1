//! Default on-disk locations for config, event log and instance marker.

use std::path::PathBuf;

use crate::error::{LeashError, Result};

const APP_DIR: &str = "btleash";

/// Directory holding the persisted config file.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| LeashError::config("Could not determine config directory"))?;
    Ok(dir.join(APP_DIR))
}

/// Directory holding the event log and instance marker.
pub fn data_dir() -> Result<PathBuf> {
    let dir =
        dirs::data_dir().ok_or_else(|| LeashError::storage("Could not determine data directory"))?;
    Ok(dir.join(APP_DIR))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("btleash.log"))
}

pub fn instance_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("btleash.instance"))
}
