// Environment variable loading

use crate::{ConfigError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::env;

/// Reads settings from prefixed environment variables.
///
/// `FIELDCHECK_MAX_BODY_BYTES=4096` becomes the key `max_body_bytes` with the
/// numeric value `4096`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Collect every matching variable from the process environment.
    pub fn load(&self) -> HashMap<String, Value> {
        self.load_from(env::vars())
    }

    /// Collect matching variables from an explicit list of pairs.
    pub fn load_from<I>(&self, vars: I) -> HashMap<String, Value>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| {
                let key = match &self.prefix {
                    Some(prefix) => key.strip_prefix(prefix.as_str())?.strip_prefix('_')?.to_string(),
                    None => key,
                };
                Some((key.to_lowercase(), scalar(&value)))
            })
            .collect()
    }

    /// Read one variable, applying the prefix.
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(crate::DEFAULT_PREFIX.to_string()))
    }
}

/// Environment values are always text; recover integers and booleans so they
/// deserialize into typed settings.
pub(crate) fn scalar(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}
