// Persistence and storage seams

pub mod config;
pub mod event_log;
pub mod instance;
pub mod paths;
pub mod store;

// Re-export commonly used items
pub use config::MonitorConfig;
pub use event_log::EventLog;
pub use store::{FileStore, FsStore, MemStore};
