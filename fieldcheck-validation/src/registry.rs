// Rule name to predicate registry

use crate::errors::RuleFailure;
use crate::grammar::RuleDescriptor;
use crate::predicates::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A predicate over the field's string form.
pub type PredicateFn = Arc<dyn Fn(&str) -> Result<(), RuleFailure> + Send + Sync>;

/// A predicate that also takes the rule's integer parameter.
pub type BoundedPredicateFn = Arc<dyn Fn(&str, usize) -> Result<(), RuleFailure> + Send + Sync>;

/// How a registered rule is evaluated.
#[derive(Clone)]
pub enum RuleCheck {
    /// Ignores any parameter.
    Plain(PredicateFn),
    /// Needs a non-negative integer parameter (`min:3`).
    Bounded(BoundedPredicateFn),
}

impl RuleCheck {
    /// Run against `value`. A bad parameter is reported as the failure.
    pub fn apply(&self, descriptor: &RuleDescriptor, value: &str) -> Result<(), RuleFailure> {
        match self {
            RuleCheck::Plain(check) => check(value),
            RuleCheck::Bounded(check) => check(value, descriptor.length_parameter()?),
        }
    }
}

impl fmt::Debug for RuleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCheck::Plain(_) => f.write_str("Plain"),
            RuleCheck::Bounded(_) => f.write_str("Bounded"),
        }
    }
}

/// Named rules available to the engine.
///
/// ```
/// use fieldcheck_validation::{RuleFailure, RuleRegistry};
///
/// let registry = RuleRegistry::builtin().register("lowercase", |value| {
///     if value.chars().all(|c| !c.is_uppercase()) {
///         Ok(())
///     } else {
///         Err(RuleFailure::Custom("must be lowercase".into()))
///     }
/// });
///
/// assert!(registry.contains("lowercase"));
/// assert!(registry.contains("email"));
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    checks: HashMap<String, RuleCheck>,
}

impl RuleRegistry {
    /// A registry with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All built-in rules.
    pub fn builtin() -> Self {
        Self::empty()
            .register("required", Required::validate)
            .register("email", IsEmail::validate)
            .register("phone", IsPhone::validate)
            .register("url", IsUrl::validate)
            .register("price", IsPrice::validate)
            .register("integer", IsInteger::validate)
            .register("float", IsFloat::validate)
            .register("date", IsDate::validate)
            .register("datetime", IsDatetime::validate)
            .register("time", IsTime::validate)
            .register("password", IsPassword::validate)
            .register("dni", IsDni::validate)
            .register_bounded("min", |value, n| MinLength(n).validate(value))
            .register_bounded("max", |value, n| MaxLength(n).validate(value))
    }

    /// Add or replace a parameterless rule.
    pub fn register<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), RuleFailure> + Send + Sync + 'static,
    {
        self.checks.insert(name.into(), RuleCheck::Plain(Arc::new(check)));
        self
    }

    /// Add or replace a rule that takes an integer parameter.
    pub fn register_bounded<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, usize) -> Result<(), RuleFailure> + Send + Sync + 'static,
    {
        self.checks
            .insert(name.into(), RuleCheck::Bounded(Arc::new(check)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&RuleCheck> {
        self.checks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}
