// Settings file loaders

use crate::env::scalar;
use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of `path` from its extension.
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!("no file extension on {}", path.display()))
            })?;

        Self::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("unsupported format: {}", ext)))
    }
}

/// Turns a settings document into a flat JSON object.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        FileFormat::detect(path.as_ref()).map(Self::new)
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Map<String, Value>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse a document. The top level must be a table/object.
    pub fn parse(&self, content: &str) -> Result<Map<String, Value>> {
        let value = match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON: {}", e)))?,
            FileFormat::Toml => toml::from_str::<Value>(content)
                .map_err(|e| ConfigError::ParseError(format!("TOML: {}", e)))?,
            FileFormat::Env => Value::Object(parse_env(content)),
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(ConfigError::ParseError(format!(
                "expected a table at the top level, found {}",
                other
            ))),
        }
    }
}

fn parse_env(content: &str) -> Map<String, Value> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_lowercase(), scalar(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let map = loader.parse(r#"{"aggregation": "last_wins", "max_body_bytes": 42}"#).unwrap();
        assert_eq!(map["max_body_bytes"], Value::from(42));
    }

    #[test]
    fn test_parse_toml_nested_table() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let map = loader
            .parse(
                r#"
                aggregation = "accumulate"

                [unique]
                users = ["email", "username"]
                "#,
            )
            .unwrap();

        assert_eq!(map["aggregation"], Value::from("accumulate"));
        assert_eq!(map["unique"]["users"][1], Value::from("username"));
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let map = loader
            .parse(
                r#"
                # comment
                AGGREGATION="first_wins"
                MAX_BODY_BYTES=1024
                "#,
            )
            .unwrap();

        assert_eq!(map["aggregation"], Value::from("first_wins"));
        assert_eq!(map["max_body_bytes"], Value::from(1024));
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let loader = ConfigLoader::new(FileFormat::Json);
        assert!(matches!(loader.parse("[1, 2]"), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::detect(Path::new("a/b.toml")).unwrap(), FileFormat::Toml);
        assert_eq!(FileFormat::from_extension("JSON"), Some(FileFormat::Json));
        assert!(FileFormat::detect(Path::new("settings")).is_err());
        assert!(FileFormat::detect(Path::new("settings.yaml")).is_err());
    }
}
