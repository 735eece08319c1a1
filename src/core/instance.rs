//! Advisory instance marker.
//!
//! A small file holding the PID of the last run. It is purely informational:
//! it never blocks a second instance from starting, it only hints that a prior
//! run may still be alive. Stale or unreadable markers are removed on sight.

use std::path::Path;

use super::store::FileStore;

/// Inspect (and clean up) a leftover marker. Always returns `false`: by
/// design a new instance is always allowed to start.
pub fn check_prior_instance(store: &dyn FileStore, path: &Path) -> bool {
    if !store.exists(path) {
        return false;
    }

    match store.read(path) {
        Ok(data) => {
            let text = String::from_utf8_lossy(&data);
            match text.trim().parse::<u32>() {
                Ok(pid) if pid != 0 => {
                    log::info!("Found instance marker for PID {}, allowing new instance", pid);
                }
                _ => {
                    log::warn!("Invalid instance marker, removing");
                    let _ = store.remove(path);
                }
            }
        }
        Err(e) => {
            log::warn!("Unreadable instance marker ({}), removing", e);
            let _ = store.remove(path);
        }
    }

    false
}

/// Write the current PID as the marker. Best-effort.
pub fn create_marker(store: &dyn FileStore, path: &Path) {
    let pid = std::process::id().to_string();
    if let Err(e) = store.write(path, pid.as_bytes()) {
        log::warn!("Failed to write instance marker: {}", e);
    }
}

/// Remove the marker on clean exit. Best-effort.
pub fn remove_marker(store: &dyn FileStore, path: &Path) {
    if store.exists(path) {
        if let Err(e) = store.remove(path) {
            log::warn!("Failed to remove instance marker: {}", e);
        }
    }
}
