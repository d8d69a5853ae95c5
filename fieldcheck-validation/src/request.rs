// Per-request facade: schema, decoded values and the last verdict

use crate::engine::Validator;
use crate::errors::ValidationVerdict;
use crate::grammar::split_rules;
use crate::ingest::{decode_body, IngestError, IngestOptions};
use crate::schema::RuleSchema;
use crate::value::FieldValue;
use crate::values::FieldValues;
use std::collections::BTreeMap;

/// One incoming request under validation.
///
/// ```
/// use fieldcheck_validation::{FormRequest, RuleSchema, Validator};
///
/// let schema = RuleSchema::new().field("age", "required|integer");
/// let mut request = FormRequest::from_body(schema, br#"{"age": 30}"#).unwrap();
///
/// assert!(request.validated(&Validator::new()));
/// assert_eq!(request.get_int("age"), 30);
/// ```
#[derive(Debug, Clone)]
pub struct FormRequest {
    schema: RuleSchema,
    values: FieldValues,
    verdict: ValidationVerdict,
}

impl FormRequest {
    /// Wrap values that were decoded elsewhere.
    pub fn new(schema: RuleSchema, values: FieldValues) -> Self {
        Self {
            schema,
            values,
            verdict: ValidationVerdict::valid(),
        }
    }

    /// Decode `body` with default options.
    pub fn from_body(schema: RuleSchema, body: &[u8]) -> Result<Self, IngestError> {
        Self::from_body_with(schema, body, &IngestOptions::default())
    }

    pub fn from_body_with(
        schema: RuleSchema,
        body: &[u8],
        options: &IngestOptions,
    ) -> Result<Self, IngestError> {
        let values = decode_body(body, &schema, options)?;
        Ok(Self::new(schema, values))
    }

    /// Run a validation pass and keep its errors. True when valid.
    pub fn validated(&mut self, validator: &Validator) -> bool {
        self.verdict = validator.validate(&self.schema, &self.values);
        self.verdict.is_valid()
    }

    /// Like [`validated`](Self::validated), returning the verdict as the error.
    pub fn check(&mut self, validator: &Validator) -> Result<(), ValidationVerdict> {
        if self.validated(validator) {
            Ok(())
        } else {
            Err(self.verdict.clone())
        }
    }

    /// Errors from the last pass. Empty before the first one.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        self.verdict.field_errors()
    }

    pub fn verdict(&self) -> &ValidationVerdict {
        &self.verdict
    }

    pub fn schema(&self) -> &RuleSchema {
        &self.schema
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Field names that carry rules.
    pub fn fields(&self) -> Vec<&str> {
        self.schema.field_names().collect()
    }

    /// Raw rule tokens of `field`, empty when it has none.
    pub fn rules_for(&self, field: &str) -> Vec<&str> {
        self.schema.rules(field).map(split_rules).unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> &FieldValue {
        self.values.get(field)
    }

    pub fn get_string(&self, field: &str) -> String {
        self.values.get_string(field)
    }

    pub fn get_int(&self, field: &str) -> isize {
        self.values.get_int(field)
    }

    pub fn get_int64(&self, field: &str) -> i64 {
        self.values.get_int64(field)
    }

    pub fn get_float64(&self, field: &str) -> f64 {
        self.values.get_float64(field)
    }

    pub fn get_float32(&self, field: &str) -> f32 {
        self.values.get_float32(field)
    }

    pub fn get_bool(&self, field: &str) -> bool {
        self.values.get_bool(field)
    }

    pub fn get_array(&self, field: &str) -> Vec<String> {
        self.values.get_array(field)
    }
}

/// Validate a [`FormRequest`] inside a handler, returning early on failure.
///
/// The verdict is converted with `From` into the handler's error type.
///
/// ```
/// use fieldcheck_validation::{validate_request, FormRequest, RuleSchema, ValidationVerdict, Validator};
///
/// fn handle(body: &[u8]) -> Result<String, ValidationVerdict> {
///     let schema = RuleSchema::new().field("name", "required");
///     let mut request = FormRequest::from_body(schema, body).expect("decodable body");
///     validate_request!(request, Validator::new());
///     Ok(request.get_string("name"))
/// }
///
/// assert_eq!(handle(b"name=Ana").unwrap(), "Ana");
/// assert!(handle(b"name=").is_err());
/// ```
#[macro_export]
macro_rules! validate_request {
    ($request:expr, $validator:expr) => {{
        $request.check(&$validator)?
    }};
}
