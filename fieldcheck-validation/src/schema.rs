// Field name to rule string mapping

use crate::grammar::{parse_rules, RuleDescriptor};
use std::collections::BTreeMap;

/// Which rules apply to which fields.
///
/// Fields are visited in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSchema {
    fields: BTreeMap<String, String>,
}

impl RuleSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn field(mut self, name: impl Into<String>, rules: impl Into<String>) -> Self {
        self.insert(name, rules);
        self
    }

    /// Set the rule string for a field, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, rules: impl Into<String>) {
        self.fields.insert(name.into(), rules.into());
    }

    /// Raw rule string for `name`.
    pub fn rules(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Parsed rules for `name`, empty when the field has none.
    pub fn descriptors(&self, name: &str) -> Vec<RuleDescriptor> {
        self.rules(name).map(parse_rules).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for RuleSchema
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let schema = RuleSchema::new()
            .field("name", "required|min:3")
            .field("email", "required|email");

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.rules("name"), Some("required|min:3"));
        assert_eq!(schema.rules("age"), None);
        assert_eq!(schema.descriptors("email")[1].name, "email");
        assert!(schema.descriptors("age").is_empty());
    }

    #[test]
    fn test_iteration_is_sorted() {
        let schema: RuleSchema = [("zip", ""), ("age", "integer"), ("name", "required")]
            .into_iter()
            .collect();
        assert_eq!(
            schema.field_names().collect::<Vec<_>>(),
            vec!["age", "name", "zip"]
        );
    }

    #[test]
    fn test_insert_replaces() {
        let mut schema = RuleSchema::new().field("age", "integer");
        schema.insert("age", "float");
        assert_eq!(schema.rules("age"), Some("float"));
    }
}
