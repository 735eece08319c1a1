// btleash Library - Public API

// Re-export error types
pub mod error;
pub use error::{LeashError, Result};

// Module declarations
pub mod core;
pub mod monitor;
pub mod radio;
pub mod ui;

// Re-export commonly used types
pub use core::config::MonitorConfig;
pub use monitor::{LifecycleController, MonitorContext, RunSettings};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
