//! Rule-string validation for request fields.
//!
//! A [`RuleSchema`] maps field names to pipe-separated rule strings such as
//! `"required|email"` or `"min:3|max:20"`. A [`Validator`] applies the
//! schema to decoded [`FieldValues`] and returns a [`ValidationVerdict`]
//! holding one message per failing field.
//!
//! # Examples
//!
//! ## Validating a request body
//!
//! ```
//! use fieldcheck_validation::{FormRequest, RuleSchema, Validator};
//!
//! let schema = RuleSchema::new()
//!     .field("name", "required|min:3")
//!     .field("email", "required|email")
//!     .field("age", "integer");
//!
//! let body = br#"{"name": "Ana", "email": "not-an-email", "age": 30}"#;
//! let mut request = FormRequest::from_body(schema, body).unwrap();
//!
//! assert!(!request.validated(&Validator::new()));
//! assert_eq!(request.errors()["email"], "invalid email");
//! assert_eq!(request.get_int("age"), 30);
//! ```
//!
//! ## Form bodies
//!
//! Bodies that are not JSON are decoded as `application/x-www-form-urlencoded`
//! and only the schema's fields are kept.
//!
//! ```
//! use fieldcheck_validation::{FormRequest, RuleSchema, Validator};
//!
//! let schema = RuleSchema::new().field("phone", "required|phone");
//! let mut request = FormRequest::from_body(schema, b"phone=%2B34600111222").unwrap();
//!
//! assert!(request.validated(&Validator::new()));
//! assert_eq!(request.get_string("phone"), "+34600111222");
//! ```
//!
//! ## Custom rules
//!
//! ```
//! use fieldcheck_validation::{FieldValues, RuleFailure, RuleRegistry, RuleSchema, Validator};
//!
//! let registry = RuleRegistry::builtin().register("even", |value| {
//!     match value.parse::<i64>() {
//!         Ok(n) if n % 2 == 0 => Ok(()),
//!         _ => Err(RuleFailure::Custom("must be even".into())),
//!     }
//! });
//! let validator = Validator::builder().registry(registry).build();
//!
//! let schema = RuleSchema::new().field("count", "required|even");
//! let verdict = validator.validate(&schema, &FieldValues::new().with("count", 3));
//! assert_eq!(verdict.message("count"), Some("must be even"));
//! ```

mod array;
mod config;
mod engine;
mod errors;
mod grammar;
mod ingest;
pub mod predicates;
mod registry;
mod request;
mod schema;
mod unique;
mod value;
mod values;

pub use array::normalize_array;
pub use config::ValidatorConfig;
pub use engine::{AggregationPolicy, Validator, ValidatorBuilder};
pub use errors::{RuleFailure, ValidationError, ValidationVerdict};
pub use grammar::{parse_rules, split_rules, RuleDescriptor};
pub use ingest::{decode_body, decode_body_as, BodyEncoding, IngestError, IngestOptions};
pub use registry::{BoundedPredicateFn, PredicateFn, RuleCheck, RuleRegistry};
pub use request::FormRequest;
pub use schema::RuleSchema;
pub use unique::{
    check_unique, LookupError, UniqueAllowlist, UniqueError, UniqueLookup, UniqueTarget,
    UNIQUE_RULE,
};
pub use value::{parse_bool_literal, FieldValue};
pub use values::FieldValues;

#[cfg(feature = "sqlite")]
pub use unique::SqliteUniqueLookup;
