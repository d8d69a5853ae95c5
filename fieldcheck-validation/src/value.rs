//! Untyped submitted values and their coercions.
//!
//! A [`FieldValue`] is whatever the body decoder produced for one field.
//! Every conversion out of it is total: shapes that cannot be converted
//! fall back to the zero value of the target type.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A decoded value of unknown type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Absent or explicitly `null`.
    #[default]
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Sequence(Vec<FieldValue>),
    /// A nested JSON object.
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The inner string when this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Default textual form. Borrows when the value already is a string.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::String(s) => Cow::Borrowed(s),
            FieldValue::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Coerce to a native integer. Floats truncate toward zero.
    pub fn to_isize(&self) -> isize {
        match self {
            FieldValue::String(s) => s.parse().unwrap_or(0),
            FieldValue::Float(f) => *f as isize,
            FieldValue::Int(i) => *i as isize,
            FieldValue::Bool(b) => isize::from(*b),
            _ => 0,
        }
    }

    /// Coerce to a 64-bit integer. Floats truncate toward zero.
    pub fn to_i64(&self) -> i64 {
        match self {
            FieldValue::String(s) => s.parse().unwrap_or(0),
            FieldValue::Float(f) => *f as i64,
            FieldValue::Int(i) => *i,
            FieldValue::Bool(b) => i64::from(*b),
            _ => 0,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            FieldValue::String(s) => parse_float(s).unwrap_or(0.0),
            FieldValue::Float(f) => *f,
            FieldValue::Int(i) => *i as f64,
            FieldValue::Bool(b) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    pub fn to_f32(&self) -> f32 {
        match self {
            FieldValue::String(s) => parse_float(s).unwrap_or(0.0),
            FieldValue::Float(f) => *f as f32,
            FieldValue::Int(i) => *i as f32,
            FieldValue::Bool(b) => f32::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    /// Strings must be a boolean literal; numbers are true when nonzero.
    pub fn to_bool(&self) -> bool {
        match self {
            FieldValue::String(s) => parse_bool_literal(s).unwrap_or(false),
            FieldValue::Bool(b) => *b,
            FieldValue::Int(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0,
            _ => false,
        }
    }

    /// Convert back into a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            FieldValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Accepted spellings: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool_literal(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse a float of the target width. Literals that only overflow to
/// infinity are out of range; spelled-out `inf` and `infinity` still parse.
pub(crate) fn parse_float<F>(s: &str) -> Option<F>
where
    F: FromStr + Into<f64> + Copy,
{
    let parsed: F = s.parse().ok()?;
    if parsed.into().is_infinite() && !spells_infinity(s) {
        return None;
    }
    Some(parsed)
}

fn spells_infinity(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Sequences render as `[a b c]`, objects as JSON text, null as nothing.
/// A null inside a sequence renders as `<nil>` so it keeps its slot.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    match item {
                        FieldValue::Null => f.write_str("<nil>")?,
                        other => write!(f, "{}", other)?,
                    }
                }
                f.write_str("]")
            }
            FieldValue::Object(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => FieldValue::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                FieldValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
