// Rule string parsing
//
// rules  := token ( "|" token )*
// token  := name | name ":" param
//
// No trimming, names are case-sensitive. A token with more than one ':' is
// kept whole as its name, so it never matches a known rule.

use crate::errors::RuleFailure;

/// One parsed rule unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub name: String,
    pub parameter: Option<String>,
}

impl RuleDescriptor {
    /// Parse a single token.
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, parameter)) if !parameter.contains(':') => Self {
                name: name.to_string(),
                parameter: Some(parameter.to_string()),
            },
            _ => Self {
                name: token.to_string(),
                parameter: None,
            },
        }
    }

    /// The parameter as a length bound, for `min` and `max`.
    pub fn length_parameter(&self) -> Result<usize, RuleFailure> {
        let raw = self
            .parameter
            .as_deref()
            .ok_or_else(|| RuleFailure::MissingParameter(self.name.clone()))?;

        raw.parse().map_err(|_| RuleFailure::InvalidParameter {
            rule: self.name.clone(),
            parameter: raw.to_string(),
        })
    }
}

/// Split a rule string into its raw tokens. An empty string has none.
pub fn split_rules(rules: &str) -> Vec<&str> {
    if rules.is_empty() {
        return Vec::new();
    }
    rules.split('|').collect()
}

/// Parse a rule string into descriptors, left to right.
pub fn parse_rules(rules: &str) -> Vec<RuleDescriptor> {
    split_rules(rules)
        .into_iter()
        .map(RuleDescriptor::parse)
        .collect()
}
