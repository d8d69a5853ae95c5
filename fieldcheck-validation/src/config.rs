// Validator settings loaded through fieldcheck-config

use crate::engine::{AggregationPolicy, Validator, ValidatorBuilder};
use crate::ingest::IngestOptions;
use crate::unique::UniqueAllowlist;
use fieldcheck_config::{ConfigError, Result, Settings, DEFAULT_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Engine settings.
///
/// ```toml
/// aggregation = "first_wins"
/// max_body_bytes = 65536
///
/// [unique]
/// users = ["email", "username"]
/// ```
///
/// With the environment layer, `FIELDCHECK_AGGREGATION` and
/// `FIELDCHECK_MAX_BODY_BYTES` override the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub aggregation: AggregationPolicy,
    pub max_body_bytes: Option<usize>,
    /// Table to the columns `unique` rules may query.
    pub unique: BTreeMap<String, Vec<String>>,
}

impl ValidatorConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config: Self = settings.deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Read `FIELDCHECK_*` variables, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let mut settings = Settings::with_prefix(DEFAULT_PREFIX);
        settings.load_dotenv(None)?;
        Self::from_settings(&settings)
    }

    /// Read a JSON, TOML or `.env` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut settings = Settings::new();
        settings.load_file(path)?;
        Self::from_settings(&settings)
    }

    fn check(&self) -> Result<()> {
        if self.max_body_bytes == Some(0) {
            return Err(ConfigError::invalid("max_body_bytes", "must be greater than 0"));
        }
        self.allowlist().map(|_| ())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            max_body_bytes: self.max_body_bytes,
        }
    }

    /// The configured `unique` tables as an allowlist.
    pub fn allowlist(&self) -> Result<UniqueAllowlist> {
        self.unique
            .iter()
            .try_fold(UniqueAllowlist::new(), |list, (table, columns)| {
                list.allow(table, columns)
            })
            .map_err(|e| ConfigError::invalid("unique", e.to_string()))
    }

    /// A builder preset with the configured policy, for adding a store.
    pub fn validator_builder(&self) -> ValidatorBuilder {
        Validator::builder().policy(self.aggregation)
    }

    pub fn build(&self) -> Result<(Validator, UniqueAllowlist)> {
        let allowlist = self.allowlist()?;
        fieldcheck_log::debug!(
            "validator configured: aggregation={} max_body_bytes={:?} unique_tables={}",
            self.aggregation,
            self.max_body_bytes,
            self.unique.len()
        );
        Ok((self.validator_builder().build(), allowlist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcheck_config::FileFormat;

    fn from_toml(content: &str) -> Result<ValidatorConfig> {
        let mut settings = Settings::new();
        settings.load_str(content, FileFormat::Toml)?;
        ValidatorConfig::from_settings(&settings)
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.aggregation, AggregationPolicy::LastWins);
        assert_eq!(config.ingest_options(), IngestOptions::default());
    }

    #[test]
    fn test_full_file() {
        let config = from_toml(
            r#"
            aggregation = "accumulate"
            max_body_bytes = 1024

            [unique]
            users = ["email", "username"]
            "#,
        )
        .unwrap();

        assert_eq!(config.aggregation, AggregationPolicy::Accumulate);
        assert_eq!(config.ingest_options().max_body_bytes, Some(1024));

        let (validator, allowlist) = config.build().unwrap();
        assert_eq!(validator.policy(), AggregationPolicy::Accumulate);
        assert!(allowlist.target("users", "username").is_ok());
        assert!(allowlist.target("users", "password").is_err());
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let err = from_toml("max_body_bytes = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "max_body_bytes"));
    }

    #[test]
    fn test_bad_identifier_rejected() {
        let err = from_toml("[unique]\n\"users;\" = [\"email\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "unique"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(matches!(
            from_toml("aggregation = \"random\""),
            Err(ConfigError::DeserializationError(_))
        ));
    }
}
