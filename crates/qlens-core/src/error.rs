//! Error types for qlens

use thiserror::Error;

/// Core error type raised by collaborators and configuration loading
#[derive(Error, Debug)]
pub enum QlensError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for qlens operations
pub type Result<T> = std::result::Result<T, QlensError>;
