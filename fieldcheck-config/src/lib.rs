//! Layered settings for fieldcheck.
//!
//! Settings come from files (JSON, TOML or `.env` style), a `.env` file in
//! the working directory, and prefixed environment variables. Later layers
//! override earlier ones key by key. The merged map deserializes into any
//! `serde` type.
//!
//! ```
//! use fieldcheck_config::{FileFormat, Settings};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Limits {
//!     max_body_bytes: usize,
//! }
//!
//! let mut settings = Settings::new();
//! settings.load_str("max_body_bytes = 2048", FileFormat::Toml).unwrap();
//!
//! let limits: Limits = settings.deserialize().unwrap();
//! assert_eq!(limits.max_body_bytes, 2048);
//! ```

pub mod env;
pub mod error;
pub mod loader;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

/// Environment prefix used when none is given.
pub const DEFAULT_PREFIX: &str = "FIELDCHECK";

/// Merged key/value settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: Map<String, Value>,
    env_prefix: Option<String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings whose environment layer reads `<prefix>_*` variables.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            values: Map::new(),
            env_prefix: Some(prefix.into()),
        }
    }

    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Overlay prefixed environment variables.
    pub fn load_env(&mut self) {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.values.extend(loader.load());
    }

    /// Load a `.env` file into the process environment, then overlay the
    /// environment. A missing default `.env` is not an error.
    pub fn load_dotenv(&mut self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.load_env();
        Ok(())
    }

    /// Overlay a settings file, detecting its format from the extension.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let map = ConfigLoader::auto(path.as_ref())?.load_file(path)?;
        self.values.extend(map);
        Ok(())
    }

    /// Overlay settings parsed from a string.
    pub fn load_str(&mut self, content: &str, format: FileFormat) -> Result<()> {
        let map = ConfigLoader::new(format).parse(content)?;
        self.values.extend(map);
        Ok(())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::DeserializationError(format!("{}: {}", key, e)))
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Deserialize every setting at once into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }
}

/// Collects settings sources, applied in the order files -> `.env` -> env.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    prefix: Option<String>,
    files: Vec<std::path::PathBuf>,
    dotenv: Option<Option<std::path::PathBuf>>,
    env: bool,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn add_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn load_dotenv(mut self, path: Option<std::path::PathBuf>) -> Self {
        self.dotenv = Some(path);
        self
    }

    pub fn load_env(mut self) -> Self {
        self.env = true;
        self
    }

    pub fn build(self) -> Result<Settings> {
        let mut settings = match self.prefix {
            Some(prefix) => Settings::with_prefix(prefix),
            None => Settings::with_prefix(DEFAULT_PREFIX),
        };

        for file in &self.files {
            settings.load_file(file)?;
        }
        if let Some(path) = self.dotenv {
            settings.load_dotenv(path.as_deref())?;
        } else if self.env {
            settings.load_env();
        }

        Ok(settings)
    }
}
