//! Append-only plaintext event log.
//!
//! One line per logged monitor tick:
//! `YYYY-MM-DD HH:MM:SS: BT=<status> RSSI=<signed-int>`
//!
//! Timestamps are best-effort local wall clock. Append failures degrade to a
//! warning; the monitor never dies because the log could not be written.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;

use super::store::FileStore;
use crate::error::Result;
use crate::monitor::state::ConnectionState;

pub struct EventLog {
    store: Arc<dyn FileStore>,
    path: PathBuf,
}

impl EventLog {
    pub fn new(store: Arc<dyn FileStore>, path: PathBuf) -> Self {
        Self { store, path }
    }

    /// Append one event line. Best-effort: storage failures are swallowed.
    pub fn append(&self, connection: ConnectionState, rssi: i8) {
        let line = format!(
            "{}: BT={} RSSI={}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            connection,
            rssi
        );
        if let Err(e) = self.store.append(&self.path, line.as_bytes()) {
            log::warn!("Failed to append event log {:?}: {}", self.path, e);
        }
    }

    /// Read the whole log as text. An absent log reads as empty.
    pub fn read_all(&self) -> Result<String> {
        if !self.store.exists(&self.path) {
            return Ok(String::new());
        }
        let data = self.store.read(&self.path)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Truncate the log.
    pub fn clear(&self) -> Result<()> {
        if self.store.exists(&self.path) {
            self.store.remove(&self.path)?;
        }
        Ok(())
    }
}
