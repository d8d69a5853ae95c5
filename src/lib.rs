// fieldcheck - rule-string validation for HTTP request fields
//
// This library re-exports the validation engine together with the logging
// and settings crates it is configured through.

// Re-export the engine
pub use fieldcheck_validation::*;

// Re-export supporting crates
pub use fieldcheck_config;
pub use fieldcheck_log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AggregationPolicy,
        FieldValue,
        FieldValues,
        FormRequest,
        IngestError,
        IngestOptions,
        RuleFailure,
        RuleRegistry,
        RuleSchema,
        // Uniqueness
        UniqueAllowlist,
        UniqueLookup,
        ValidationVerdict,
        Validator,
        ValidatorConfig,
        validate_request,
    };
}
