// Decoded per-request field values with typed accessors

use crate::array::normalize_array;
use crate::value::FieldValue;
use std::collections::HashMap;

static EMPTY_STRING: FieldValue = FieldValue::String(String::new());

/// The decoded field name to value mapping for one request.
///
/// Every accessor is total. A missing or `null` field reads as `""`, zero,
/// `false` or an empty list depending on the accessor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    values: HashMap<String, FieldValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the top-level keys of a decoded JSON object.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .into_iter()
            .map(|(key, value)| (key, FieldValue::from(value)))
            .collect()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The stored value, `None` when the field was never submitted.
    pub fn raw(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// The untyped value. Missing and `null` fields read as an empty string.
    pub fn get(&self, field: &str) -> &FieldValue {
        match self.values.get(field) {
            None | Some(FieldValue::Null) => &EMPTY_STRING,
            Some(value) => value,
        }
    }

    pub fn get_string(&self, field: &str) -> String {
        self.values
            .get(field)
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default()
    }

    pub fn get_int(&self, field: &str) -> isize {
        self.values.get(field).map_or(0, FieldValue::to_isize)
    }

    pub fn get_int64(&self, field: &str) -> i64 {
        self.values.get(field).map_or(0, FieldValue::to_i64)
    }

    pub fn get_float64(&self, field: &str) -> f64 {
        self.values.get(field).map_or(0.0, FieldValue::to_f64)
    }

    pub fn get_float32(&self, field: &str) -> f32 {
        self.values.get(field).map_or(0.0, FieldValue::to_f32)
    }

    pub fn get_bool(&self, field: &str) -> bool {
        self.values.get(field).is_some_and(FieldValue::to_bool)
    }

    /// Multi-value read, see [`normalize_array`].
    pub fn get_array(&self, field: &str) -> Vec<String> {
        match self.values.get(field) {
            None | Some(FieldValue::Null) => Vec::new(),
            Some(value) => normalize_array(value),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for FieldValues
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
