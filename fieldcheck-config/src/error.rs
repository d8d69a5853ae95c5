// Errors raised while loading settings

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Setting not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to load settings: {0}")]
    LoadError(String),

    #[error("Failed to parse settings: {0}")]
    ParseError(String),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
}

impl ConfigError {
    /// Shorthand for an out-of-range or malformed setting.
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
