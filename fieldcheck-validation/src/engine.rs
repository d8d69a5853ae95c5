// Validation engine: applies a schema to decoded values

use crate::errors::{RuleFailure, ValidationError, ValidationVerdict};
use crate::registry::RuleRegistry;
use crate::schema::RuleSchema;
use crate::unique::{check_unique, UniqueLookup, UniqueTarget, UNIQUE_RULE};
use crate::values::FieldValues;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How several failures on one field are folded into its message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// The last failing rule's message is kept.
    #[default]
    LastWins,
    /// The first failing rule's message is kept.
    FirstWins,
    /// Every message, joined with `"; "`.
    Accumulate,
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AggregationPolicy::LastWins => "last_wins",
            AggregationPolicy::FirstWins => "first_wins",
            AggregationPolicy::Accumulate => "accumulate",
        })
    }
}

/// Applies rule schemas to field values.
///
/// Immutable once built; share it behind an `Arc` across threads.
///
/// ```
/// use fieldcheck_validation::{FieldValues, RuleSchema, Validator};
///
/// let schema = RuleSchema::new()
///     .field("name", "required|min:3")
///     .field("email", "required|email");
/// let values = FieldValues::new()
///     .with("name", "ab")
///     .with("email", "ana@example.com");
///
/// let verdict = Validator::new().validate(&schema, &values);
/// assert!(!verdict.is_valid());
/// assert_eq!(verdict.message("name"), Some("below minimum length 3"));
/// ```
#[derive(Clone)]
pub struct Validator {
    registry: Arc<RuleRegistry>,
    policy: AggregationPolicy,
    unique: HashMap<String, UniqueTarget>,
    store: Option<Arc<dyn UniqueLookup>>,
}

impl Validator {
    /// Built-in rules, last-wins aggregation, no uniqueness store.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run one validation pass.
    ///
    /// Fields the schema does not mention are never looked at. Within a
    /// field, rules run left to right and every rule runs even after a
    /// failure.
    pub fn validate(&self, schema: &RuleSchema, values: &FieldValues) -> ValidationVerdict {
        let mut verdict = ValidationVerdict::valid();
        if schema.is_empty() {
            return verdict;
        }

        for (field, rules) in schema.iter() {
            if rules.is_empty() {
                continue;
            }
            let value = values.get_string(field);

            for descriptor in schema.descriptors(field) {
                let unique = if descriptor.name == UNIQUE_RULE {
                    self.check_unique(field, &value)
                } else {
                    None
                };

                let outcome = match (unique, self.registry.get(&descriptor.name)) {
                    (Some(result), _) => result,
                    (None, Some(check)) => check.apply(&descriptor, &value),
                    (None, None) => {
                        fieldcheck_log::trace!(
                            "ignoring unknown rule {:?} on field {}",
                            descriptor.name,
                            field
                        );
                        continue;
                    }
                };

                if let Err(failure) = outcome {
                    fieldcheck_log::debug!(
                        "field {} failed rule {}: {}",
                        field,
                        descriptor.name,
                        failure
                    );
                    verdict.record(
                        self.policy,
                        ValidationError::new(field, descriptor.name.as_str(), failure)
                            .with_value(value.as_str()),
                    );
                }
            }
        }

        verdict
    }

    /// `None` when no uniqueness check is configured for the field.
    fn check_unique(&self, field: &str, value: &str) -> Option<Result<(), RuleFailure>> {
        let target = self.unique.get(field)?;
        let store = self.store.as_deref()?;
        Some(check_unique(store, target, value))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("unique", &self.unique)
            .field("store", &self.store.is_some())
            .finish()
    }
}

/// Builder for [`Validator`].
#[derive(Default)]
pub struct ValidatorBuilder {
    registry: Option<RuleRegistry>,
    policy: AggregationPolicy,
    unique: HashMap<String, UniqueTarget>,
    store: Option<Arc<dyn UniqueLookup>>,
}

impl ValidatorBuilder {
    pub fn policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the built-in rule catalog.
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Store consulted by `unique` rules.
    pub fn unique_store(mut self, store: Arc<dyn UniqueLookup>) -> Self {
        self.store = Some(store);
        self
    }

    /// Check `unique` on `field` against `target`.
    pub fn unique(mut self, field: impl Into<String>, target: UniqueTarget) -> Self {
        self.unique.insert(field.into(), target);
        self
    }

    pub fn build(self) -> Validator {
        Validator {
            registry: Arc::new(self.registry.unwrap_or_else(RuleRegistry::builtin)),
            policy: self.policy,
            unique: self.unique,
            store: self.store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unique::{LookupError, UniqueAllowlist};

    struct Taken(&'static str);

    impl UniqueLookup for Taken {
        fn count_matching(&self, _: &UniqueTarget, value: &str) -> Result<u64, LookupError> {
            Ok(u64::from(value == self.0))
        }
    }

    fn users_email() -> UniqueTarget {
        UniqueAllowlist::new()
            .allow("users", ["email"])
            .unwrap()
            .target("users", "email")
            .unwrap()
    }

    #[test]
    fn test_empty_schema_is_valid() {
        let values = FieldValues::new().with("name", "");
        let verdict = Validator::new().validate(&RuleSchema::new(), &values);
        assert!(verdict.is_valid());
        assert!(verdict.failures().is_empty());
    }

    #[test]
    fn test_empty_rule_string_skipped() {
        let schema = RuleSchema::new().field("name", "");
        assert!(Validator::new().validate(&schema, &FieldValues::new()).is_valid());
    }

    #[test]
    fn test_absent_field_reads_empty() {
        let schema = RuleSchema::new().field("name", "required");
        let verdict = Validator::new().validate(&schema, &FieldValues::new());
        assert_eq!(verdict.message("name"), Some("field required"));
    }

    #[test]
    fn test_fields_outside_schema_pass() {
        let schema = RuleSchema::new().field("name", "required");
        let values = FieldValues::new().with("name", "Ana").with("email", "nope");
        assert!(Validator::new().validate(&schema, &values).is_valid());
    }

    #[test]
    fn test_last_failure_wins_by_default() {
        let schema = RuleSchema::new().field("email", "required|email");
        let verdict = Validator::new().validate(&schema, &FieldValues::new());
        assert_eq!(verdict.message("email"), Some("invalid email"));
        assert_eq!(verdict.failures().len(), 2);
    }

    #[test]
    fn test_first_wins_and_accumulate() {
        let schema = RuleSchema::new().field("email", "required|email");
        let values = FieldValues::new();

        let first = Validator::builder()
            .policy(AggregationPolicy::FirstWins)
            .build()
            .validate(&schema, &values);
        assert_eq!(first.message("email"), Some("field required"));

        let all = Validator::builder()
            .policy(AggregationPolicy::Accumulate)
            .build()
            .validate(&schema, &values);
        assert_eq!(all.message("email"), Some("field required; invalid email"));
    }

    #[test]
    fn test_unknown_rules_ignored() {
        let schema = RuleSchema::new().field("code", "uuid|Required|min:1:2");
        assert!(Validator::new().validate(&schema, &FieldValues::new()).is_valid());
    }

    #[test]
    fn test_bad_parameter_is_field_error() {
        let schema = RuleSchema::new().field("name", "min:abc");
        let values = FieldValues::new().with("name", "Ana");
        let verdict = Validator::new().validate(&schema, &values);
        assert_eq!(verdict.message("name"), Some("invalid parameter for min: abc"));
        assert!(verdict.failures()[0].failure.is_schema_error());
    }

    #[test]
    fn test_failure_keeps_offending_value() {
        let schema = RuleSchema::new().field("age", "integer");
        let values = FieldValues::new().with("age", "3x");
        let verdict = Validator::new().validate(&schema, &values);
        let failure = &verdict.failures()[0];
        assert_eq!(failure.field, "age");
        assert_eq!(failure.rule, "integer");
        assert_eq!(failure.value.as_deref(), Some("3x"));
    }

    #[test]
    fn test_custom_registry() {
        let registry = RuleRegistry::builtin().register("lowercase", |value| {
            if value.chars().any(char::is_uppercase) {
                Err(RuleFailure::Custom("must be lowercase".into()))
            } else {
                Ok(())
            }
        });
        let validator = Validator::builder().registry(registry).build();
        let schema = RuleSchema::new().field("slug", "lowercase");

        let verdict = validator.validate(&schema, &FieldValues::new().with("slug", "Hello"));
        assert_eq!(verdict.message("slug"), Some("must be lowercase"));
    }

    #[test]
    fn test_unique_needs_store_and_target() {
        let schema = RuleSchema::new().field("email", "unique");
        let values = FieldValues::new().with("email", "taken@example.com");

        // without configuration the rule is ignored
        assert!(Validator::new().validate(&schema, &values).is_valid());

        let validator = Validator::builder()
            .unique_store(Arc::new(Taken("taken@example.com")))
            .unique("email", users_email())
            .build();
        let verdict = validator.validate(&schema, &values);
        assert_eq!(verdict.message("email"), Some("value not unique"));

        let free = FieldValues::new().with("email", "free@example.com");
        assert!(validator.validate(&schema, &free).is_valid());
    }

    #[test]
    fn test_validator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test]
    fn test_policy_serde() {
        let policy: AggregationPolicy = serde_json::from_str("\"first_wins\"").unwrap();
        assert_eq!(policy, AggregationPolicy::FirstWins);
        assert_eq!(AggregationPolicy::default().to_string(), "last_wins");
    }
}
