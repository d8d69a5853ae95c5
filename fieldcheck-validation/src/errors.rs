// Rule failures, per-application errors and the aggregated verdict

use crate::engine::AggregationPolicy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Why a single rule rejected a value.
///
/// The `Display` text is the message reported for the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleFailure {
    #[error("field required")]
    Required,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid phone")]
    InvalidPhone,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid price format")]
    InvalidPrice,

    #[error("invalid integer")]
    InvalidInteger,

    #[error("invalid float")]
    InvalidFloat,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid datetime")]
    InvalidDatetime,

    #[error("invalid time")]
    InvalidTime,

    #[error("invalid password")]
    InvalidPassword,

    #[error("below minimum length {0}")]
    BelowMinLength(usize),

    #[error("exceeds maximum length {0}")]
    ExceedsMaxLength(usize),

    #[error("invalid national ID")]
    InvalidNationalId,

    #[error("value not unique")]
    NotUnique,

    #[error("uniqueness lookup failed: {0}")]
    LookupFailed(String),

    /// `min` or `max` given without `:N`.
    #[error("missing parameter for {0}")]
    MissingParameter(String),

    /// `min` or `max` whose parameter is not a non-negative integer.
    #[error("invalid parameter for {rule}: {parameter}")]
    InvalidParameter { rule: String, parameter: String },

    /// Raised by caller-registered rules.
    #[error("{0}")]
    Custom(String),
}

impl RuleFailure {
    /// Stable machine-readable name of the failure kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RuleFailure::Required => "required",
            RuleFailure::InvalidEmail => "email",
            RuleFailure::InvalidPhone => "phone",
            RuleFailure::InvalidUrl => "url",
            RuleFailure::InvalidPrice => "price",
            RuleFailure::InvalidInteger => "integer",
            RuleFailure::InvalidFloat => "float",
            RuleFailure::InvalidDate => "date",
            RuleFailure::InvalidDatetime => "datetime",
            RuleFailure::InvalidTime => "time",
            RuleFailure::InvalidPassword => "password",
            RuleFailure::BelowMinLength(_) => "min",
            RuleFailure::ExceedsMaxLength(_) => "max",
            RuleFailure::InvalidNationalId => "dni",
            RuleFailure::NotUnique => "unique",
            RuleFailure::LookupFailed(_) => "lookup_failed",
            RuleFailure::MissingParameter(_) | RuleFailure::InvalidParameter { .. } => {
                "rule_parameter"
            }
            RuleFailure::Custom(_) => "custom",
        }
    }

    /// True for failures caused by the rule string rather than the value.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            RuleFailure::MissingParameter(_) | RuleFailure::InvalidParameter { .. }
        )
    }
}

/// One failed rule application.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field that failed
    pub field: String,

    /// Rule name as written in the rule string
    pub rule: String,

    /// Failure reason
    pub failure: RuleFailure,

    /// The string form of the rejected value
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, rule: impl Into<String>, failure: RuleFailure) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            failure,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn message(&self) -> String {
        self.failure.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.failure)
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of one validation pass.
///
/// `field_errors` holds at most one message per field, shaped by the
/// [`AggregationPolicy`] in effect. `failures` keeps every failed rule
/// application in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationVerdict {
    #[serde(rename = "errors")]
    field_errors: BTreeMap<String, String>,
    #[serde(skip)]
    failures: Vec<ValidationError>,
}

impl ValidationVerdict {
    /// A passing verdict with no errors.
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Field name to message.
    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn into_field_errors(self) -> BTreeMap<String, String> {
        self.field_errors
    }

    /// Message recorded for `field`, if it failed.
    pub fn message(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    /// Every failed rule application, in evaluation order.
    pub fn failures(&self) -> &[ValidationError] {
        &self.failures
    }

    /// Failed rule applications for one field, in evaluation order.
    pub fn failures_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.failures.iter().filter(move |e| e.field == field)
    }

    /// Number of fields with an error.
    pub fn len(&self) -> usize {
        self.field_errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// `{"valid": bool, "errors": {field: message}}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "valid": self.is_valid(),
            "errors": self.field_errors,
        })
    }

    pub(crate) fn record(&mut self, policy: AggregationPolicy, error: ValidationError) {
        let message = error.message();
        match policy {
            AggregationPolicy::LastWins => {
                self.field_errors.insert(error.field.clone(), message);
            }
            AggregationPolicy::FirstWins => {
                self.field_errors
                    .entry(error.field.clone())
                    .or_insert(message);
            }
            AggregationPolicy::Accumulate => {
                self.field_errors
                    .entry(error.field.clone())
                    .and_modify(|existing| {
                        existing.push_str("; ");
                        existing.push_str(&message);
                    })
                    .or_insert(message);
            }
        }
        self.failures.push(error);
    }
}

impl fmt::Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return f.write_str("valid");
        }
        let parts: Vec<String> = self
            .field_errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationVerdict {}
