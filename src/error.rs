use std::io;
use thiserror::Error;

/// Custom error type for the btleash application
#[derive(Error, Debug)]
pub enum LeashError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for the btleash application
pub type Result<T> = std::result::Result<T, LeashError>;

impl LeashError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        LeashError::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        LeashError::Storage(msg.into())
    }
}
