// Multi-value field normalization

use crate::value::FieldValue;

/// Turn a value of unknown shape into a list of strings.
///
/// - a string is split on `,`
/// - a sequence of strings is returned as is
/// - anything else is rendered to text, one surrounding `[`/`]` pair is
///   stripped and the rest is split on whitespace
///
/// The last case is lossy for nested shapes.
pub fn normalize_array(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::String(s) => s.split(',').map(str::to_string).collect(),
        FieldValue::Sequence(items) if items.iter().all(|i| i.as_str().is_some()) => items
            .iter()
            .filter_map(FieldValue::as_str)
            .map(str::to_string)
            .collect(),
        other => {
            let text = other.to_string();
            let inner = text.strip_prefix('[').unwrap_or(&text);
            let inner = inner.strip_suffix(']').unwrap_or(inner);
            inner.split_whitespace().map(str::to_string).collect()
        }
    }
}
