//! Integration tests for common fieldcheck workflows.
//!
//! These tests go through the top-level crate the way an application would.

use fieldcheck::prelude::*;
use fieldcheck::{normalize_array, parse_bool_literal};

// =============================================================================
// Handler Tests
// =============================================================================

#[derive(Debug)]
enum ApiError {
    BadRequest(serde_json::Value),
    Unprocessable(String),
}

impl From<ValidationVerdict> for ApiError {
    fn from(verdict: ValidationVerdict) -> Self {
        ApiError::BadRequest(verdict.to_json())
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}

fn signup_schema() -> RuleSchema {
    RuleSchema::new()
        .field("username", "required|min:3|max:20")
        .field("email", "required|email")
        .field("password", "required|password")
        .field("phone", "phone")
        .field("birthday", "date")
}

fn signup(body: &[u8]) -> Result<String, ApiError> {
    let mut request = FormRequest::from_body(signup_schema(), body)?;
    validate_request!(request, Validator::new());
    Ok(request.get_string("username"))
}

#[test]
fn test_handler_accepts_valid_json() {
    let body = br#"{
        "username": "ana",
        "email": "ana@example.com",
        "password": "s3cret!pw",
        "phone": "+34600111222",
        "birthday": "1990-05-17"
    }"#;
    assert_eq!(signup(body).unwrap(), "ana");
}

#[test]
fn test_handler_accepts_valid_form() {
    let body = b"username=ana&email=ana%40example.com&password=s3cret%21pw&phone=%2B34600111222&birthday=1990-05-17";
    assert_eq!(signup(body).unwrap(), "ana");
}

#[test]
fn test_handler_reports_every_failing_field() {
    let body = br#"{"username": "an", "email": "nope", "password": "abc12345", "phone": "600"}"#;

    let Err(ApiError::BadRequest(json)) = signup(body) else {
        panic!("expected a validation failure");
    };
    assert_eq!(json["valid"], false);
    assert_eq!(json["errors"]["username"], "below minimum length 3");
    assert_eq!(json["errors"]["email"], "invalid email");
    assert_eq!(json["errors"]["password"], "invalid password");
    assert_eq!(json["errors"]["phone"], "invalid phone");
    // "" does not parse as a date
    assert_eq!(json["errors"]["birthday"], "invalid date");
}

#[test]
fn test_handler_rejects_non_object_json() {
    assert!(matches!(signup(b"\"ana\""), Err(ApiError::Unprocessable(_))));
}

// =============================================================================
// Engine Properties
// =============================================================================

#[test]
fn test_empty_schema_always_valid() {
    let values = FieldValues::new().with("anything", "");
    assert!(Validator::new().validate(&RuleSchema::new(), &values).is_valid());
}

#[test]
fn test_fields_outside_schema_always_pass() {
    let schema = RuleSchema::new().field("name", "required");
    let values = FieldValues::new()
        .with("name", "Ana")
        .with("email", "definitely not an email")
        .with("age", "old");
    assert!(Validator::new().validate(&schema, &values).is_valid());
}

#[test]
fn test_min_then_max_keeps_min_message() {
    let schema = RuleSchema::new().field("code", "min:3|max:5");
    let verdict = Validator::new().validate(&schema, &FieldValues::new().with("code", "ab"));
    assert_eq!(verdict.message("code"), Some("below minimum length 3"));
}

#[test]
fn test_aggregation_policies() {
    let schema = RuleSchema::new().field("email", "required|email|min:5");
    let values = FieldValues::new();

    let message = |policy| {
        Validator::builder()
            .policy(policy)
            .build()
            .validate(&schema, &values)
            .message("email")
            .map(str::to_string)
    };

    assert_eq!(
        message(AggregationPolicy::LastWins).as_deref(),
        Some("below minimum length 5")
    );
    assert_eq!(
        message(AggregationPolicy::FirstWins).as_deref(),
        Some("field required")
    );
    assert_eq!(
        message(AggregationPolicy::Accumulate).as_deref(),
        Some("field required; invalid email; below minimum length 5")
    );
}

#[test]
fn test_dni_and_password_examples() {
    let schema = RuleSchema::new().field("dni", "dni").field("pw", "password");

    let check = |dni: &str, pw: &str| {
        let values = FieldValues::new().with("dni", dni).with("pw", pw);
        Validator::new().validate(&schema, &values)
    };

    assert!(check("12345678Z", "abc123$%").is_valid());
    assert!(check("1234567", "abc123$%").has_error("dni"));
    assert!(check("U2345678B", "abc123$%").has_error("dni"));
    assert!(check("12345678Z", "abc12345").has_error("pw"));
}

// =============================================================================
// Typed Accessor Properties
// =============================================================================

#[test]
fn test_numeric_coercion_of_booleans_and_absent() {
    let values = FieldValues::new().with("yes", true).with("no", false);

    assert_eq!(values.get_int("yes"), 1);
    assert_eq!(values.get_int64("yes"), 1);
    assert_eq!(values.get_float64("yes"), 1.0);
    assert_eq!(values.get_int("no"), 0);
    assert_eq!(values.get_float64("no"), 0.0);
    assert_eq!(values.get_int("absent"), 0);
    assert_eq!(values.get_int64("absent"), 0);
    assert_eq!(values.get_float64("absent"), 0.0);
}

#[test]
fn test_bool_coercion() {
    let values = FieldValues::new()
        .with("s", "1")
        .with("b", true)
        .with("n", 1)
        .with("maybe", "maybe");

    assert!(values.get_bool("s"));
    assert!(values.get_bool("b"));
    assert!(values.get_bool("n"));
    assert!(!values.get_bool("maybe"));
    assert!(!values.get_bool("absent"));
    assert_eq!(parse_bool_literal("TRUE"), Some(true));
    assert_eq!(parse_bool_literal("yes"), None);
}

#[test]
fn test_json_number_reads() {
    let request = FormRequest::from_body(RuleSchema::new(), br#"{"age": 30, "ratio": 2.5}"#).unwrap();
    assert_eq!(request.get_int("age"), 30);
    assert_eq!(request.get_string("age"), "30");
    assert_eq!(request.get_float32("ratio"), 2.5);
    assert_eq!(request.get_int("ratio"), 2);
}

#[test]
fn test_array_normalization() {
    assert_eq!(normalize_array(&FieldValue::from("a,b,c")), vec!["a", "b", "c"]);
    assert_eq!(normalize_array(&FieldValue::from(vec!["x", "y"])), vec!["x", "y"]);
    assert_eq!(normalize_array(&FieldValue::from(vec![1, 2, 3])), vec!["1", "2", "3"]);

    let request =
        FormRequest::from_body(RuleSchema::new(), br#"{"ids": [4, 5], "tags": "red,blue"}"#).unwrap();
    assert_eq!(request.get_array("ids"), vec!["4", "5"]);
    assert_eq!(request.get_array("tags"), vec!["red", "blue"]);
    assert!(request.get_array("absent").is_empty());
}

// =============================================================================
// Extension Tests
// =============================================================================

#[test]
fn test_registered_rule_in_schema() {
    let registry = RuleRegistry::builtin().register("slug", |value| {
        if !value.is_empty()
            && value
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            Ok(())
        } else {
            Err(RuleFailure::Custom("invalid slug".into()))
        }
    });
    let validator = Validator::builder().registry(registry).build();
    let schema = RuleSchema::new().field("path", "required|slug|max:32");

    let ok = FieldValues::new().with("path", "hello-world-2");
    assert!(validator.validate(&schema, &ok).is_valid());

    let bad = FieldValues::new().with("path", "Hello World");
    assert_eq!(
        validator.validate(&schema, &bad).message("path"),
        Some("invalid slug")
    );
}

#[test]
fn test_config_round_trip() {
    let mut settings = fieldcheck::fieldcheck_config::Settings::new();
    settings
        .load_str(
            r#"{"aggregation": "accumulate", "unique": {"users": ["email"]}}"#,
            fieldcheck::fieldcheck_config::FileFormat::Json,
        )
        .unwrap();

    let config = ValidatorConfig::from_settings(&settings).unwrap();
    let (validator, allowlist) = config.build().unwrap();

    assert_eq!(validator.policy(), AggregationPolicy::Accumulate);
    assert!(allowlist.target("users", "email").is_ok());
    assert!(matches!(
        allowlist.target("users", "email; DROP TABLE users"),
        Err(fieldcheck::UniqueError::ColumnNotAllowed { .. })
    ));
}

#[test]
fn test_logging_level_controls() {
    use fieldcheck::fieldcheck_log::{self, Level};

    fieldcheck_log::set_level(Level::Error);
    assert!(!fieldcheck_log::is_level_enabled(Level::Debug));

    // validation still works with logging quiet
    let schema = RuleSchema::new().field("n", "integer");
    assert!(!Validator::new()
        .validate(&schema, &FieldValues::new().with("n", "x"))
        .is_valid());
}
