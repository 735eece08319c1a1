use std::path::Path;

use tempfile::TempDir;

use btleash::core::{FsStore, MemStore, MonitorConfig};
use btleash::core::store::FileStore;

#[test]
fn roundtrip_survives_restart() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    let store = FsStore::new();

    let config = MonitorConfig { enabled: true };
    config.save_to(&store, &path).unwrap();

    // A fresh store stands in for a restarted process.
    let store = FsStore::new();
    let loaded = MonitorConfig::load_from(&store, &path);
    assert!(loaded.enabled);
}

#[test]
fn save_creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("config.json");
    let store = FsStore::new();

    MonitorConfig { enabled: true }.save_to(&store, &path).unwrap();
    assert!(store.exists(&path));
}

#[test]
fn missing_and_corrupt_files_load_defaults() {
    let store = MemStore::new();

    let loaded = MonitorConfig::load_from(&store, Path::new("/missing.json"));
    assert!(!loaded.enabled);

    store.write(Path::new("/bad.json"), b"####").unwrap();
    let loaded = MonitorConfig::load_from(&store, Path::new("/bad.json"));
    assert!(!loaded.enabled);
}
