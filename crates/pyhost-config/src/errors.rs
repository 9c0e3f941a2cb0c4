use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while producing or persisting startup configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for config key '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("Virtual environment not found: {}", .0.display())]
    VenvNotFound(PathBuf),

    #[error("{0}")]
    PathResolution(String),

    #[error("Configuration provider failed: {0}")]
    Provider(String),
}
