//! Fuzz target for request body ingestion.
//!
//! Arbitrary bytes are decoded as JSON or form data and every typed accessor
//! is read back. Decoding may fail; accessors must not panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use fieldcheck_validation::{FormRequest, IngestOptions, RuleSchema, Validator};

#[derive(Debug, Arbitrary)]
struct FuzzBody {
    body: Vec<u8>,
    fields: Vec<String>,
    limit: Option<u16>,
}

fuzz_target!(|data: FuzzBody| {
    let schema: RuleSchema = data
        .fields
        .iter()
        .map(|field| (field.as_str(), "required|integer|min:1|max:8|date|password"))
        .collect();

    let options = IngestOptions {
        max_body_bytes: data.limit.map(usize::from),
    };
    let Ok(mut request) = FormRequest::from_body_with(schema, &data.body, &options) else {
        return;
    };

    let _ = request.validated(&Validator::new());
    for field in &data.fields {
        let _ = request.get_string(field);
        let _ = request.get_int(field);
        let _ = request.get_int64(field);
        let _ = request.get_float64(field);
        let _ = request.get_float32(field);
        let _ = request.get_bool(field);
        let _ = request.get_array(field);
    }
});
