// Request body ingestion: JSON object or urlencoded form

use crate::schema::RuleSchema;
use crate::values::FieldValues;
use std::fmt;
use thiserror::Error;

/// Ingestion failed; no verdict can be produced.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The body is valid JSON but its top level is not an object.
    #[error("JSON body must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("invalid form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    #[error("body of {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },
}

/// How a body was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Form,
}

impl fmt::Display for BodyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BodyEncoding::Json => "json",
            BodyEncoding::Form => "form",
        })
    }
}

/// Ingestion limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Reject bodies larger than this before decoding.
    pub max_body_bytes: Option<usize>,
}

impl IngestOptions {
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }
}

/// Decode a raw body into field values.
///
/// A JSON object keeps all its top-level keys and JSON `null` gives an
/// empty set. A form body yields exactly the schema's fields; the first
/// occurrence of a repeated key wins and missing keys read as `""`.
pub fn decode_body(
    body: &[u8],
    schema: &RuleSchema,
    options: &IngestOptions,
) -> Result<FieldValues, IngestError> {
    decode_body_as(body, schema, options).map(|(_, values)| values)
}

/// Like [`decode_body`], also reporting which encoding was used.
///
/// The body is JSON when it parses as JSON in full, form otherwise.
pub fn decode_body_as(
    body: &[u8],
    schema: &RuleSchema,
    options: &IngestOptions,
) -> Result<(BodyEncoding, FieldValues), IngestError> {
    match options.max_body_bytes {
        Some(limit) if body.len() > limit => {
            return Err(IngestError::PayloadTooLarge {
                size: body.len(),
                limit,
            });
        }
        _ => {}
    }

    let decoded = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(json) => (BodyEncoding::Json, decode_json(json)?),
        Err(_) => (BodyEncoding::Form, decode_form(body, schema)?),
    };
    fieldcheck_log::debug!(
        "decoded {} byte body as {} ({} fields)",
        body.len(),
        decoded.0,
        decoded.1.len()
    );
    Ok(decoded)
}

fn decode_json(json: serde_json::Value) -> Result<FieldValues, IngestError> {
    match json {
        serde_json::Value::Object(map) => Ok(FieldValues::from_json_object(map)),
        serde_json::Value::Null => Ok(FieldValues::new()),
        serde_json::Value::Bool(_) => Err(IngestError::NotAnObject("boolean")),
        serde_json::Value::Number(_) => Err(IngestError::NotAnObject("number")),
        serde_json::Value::String(_) => Err(IngestError::NotAnObject("string")),
        serde_json::Value::Array(_) => Err(IngestError::NotAnObject("array")),
    }
}

fn decode_form(body: &[u8], schema: &RuleSchema) -> Result<FieldValues, IngestError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;

    Ok(schema
        .field_names()
        .map(|field| {
            let value = pairs
                .iter()
                .find(|(key, _)| key == field)
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            (field, value)
        })
        .collect())
}
