//! Fuzz target for rule strings.
//!
//! Any rule string applied to any value must produce a verdict, never a panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use fieldcheck_validation::{FieldValues, RuleSchema, Validator, parse_rules};

#[derive(Debug, Arbitrary)]
struct FuzzRules {
    rules: String,
    value: String,
}

fuzz_target!(|data: FuzzRules| {
    let descriptors = parse_rules(&data.rules);
    for descriptor in &descriptors {
        let _ = descriptor.length_parameter();
    }

    let schema = RuleSchema::new().field("f", data.rules.as_str());
    let values = FieldValues::new().with("f", data.value.as_str());
    let verdict = Validator::new().validate(&schema, &values);

    // a verdict never names a field outside the schema
    assert!(verdict.field_errors().keys().all(|field| field == "f"));
    let _ = verdict.to_json();
});
