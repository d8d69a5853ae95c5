use criterion::{Criterion, criterion_group, criterion_main};
use fieldcheck::predicates::*;
use fieldcheck::*;
use std::hint::black_box;

fn bench_pattern_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_predicates");

    let valid_emails = vec![
        "user@example.com",
        "first.last@example.co",
        "admin_1@mail-host.io",
    ];
    let invalid_emails = vec!["invalid-email", "@example.com", "user@"];

    group.bench_function("valid_emails", |b| {
        b.iter(|| {
            for email in &valid_emails {
                IsEmail::validate(black_box(email)).unwrap();
            }
        })
    });

    group.bench_function("invalid_emails", |b| {
        b.iter(|| {
            for email in &invalid_emails {
                let _ = IsEmail::validate(black_box(email));
            }
        })
    });

    group.bench_function("url", |b| {
        b.iter(|| IsUrl::validate(black_box("https://example.com/path?query=value")))
    });

    group.bench_function("phone", |b| {
        b.iter(|| IsPhone::validate(black_box("+14155552671")))
    });

    group.finish();
}

fn bench_scalar_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_predicates");

    group.bench_function("date", |b| {
        b.iter(|| IsDate::validate(black_box("2024-02-29")))
    });

    group.bench_function("datetime", |b| {
        b.iter(|| IsDatetime::validate(black_box("2024-02-29 12:30:45")))
    });

    group.bench_function("password", |b| {
        b.iter(|| IsPassword::validate(black_box("s3cret!password")))
    });

    group.bench_function("dni", |b| {
        b.iter(|| IsDni::validate(black_box("12345678Z")))
    });

    group.bench_function("min_length", |b| {
        let bound = MinLength(5);
        b.iter(|| bound.validate(black_box("Hello World 123")))
    });

    group.finish();
}

fn bench_rule_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_parsing");

    group.bench_function("short", |b| {
        b.iter(|| parse_rules(black_box("required|email")))
    });

    group.bench_function("long", |b| {
        b.iter(|| parse_rules(black_box("required|min:3|max:20|password|unique|custom:1:2")))
    });

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    let validator = Validator::new();
    let schema = RuleSchema::new()
        .field("username", "required|min:3|max:20")
        .field("email", "required|email")
        .field("password", "required|password")
        .field("age", "integer")
        .field("birthday", "date");

    let valid = FieldValues::new()
        .with("username", "ana")
        .with("email", "ana@example.com")
        .with("password", "s3cret!pw")
        .with("age", 30)
        .with("birthday", "1990-05-17");
    let invalid = FieldValues::new().with("username", "a").with("age", "x");

    group.bench_function("valid_request", |b| {
        b.iter(|| validator.validate(black_box(&schema), black_box(&valid)))
    });

    group.bench_function("invalid_request", |b| {
        b.iter(|| validator.validate(black_box(&schema), black_box(&invalid)))
    });

    group.finish();
}

fn bench_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");

    let schema = RuleSchema::new()
        .field("username", "required")
        .field("email", "required|email");
    let options = IngestOptions::default();
    let json = br#"{"username": "ana", "email": "ana@example.com", "tags": ["a", "b"]}"#;
    let form = b"username=ana&email=ana%40example.com&tags=a%2Cb";

    group.bench_function("json_body", |b| {
        b.iter(|| decode_body(black_box(json), &schema, &options))
    });

    group.bench_function("form_body", |b| {
        b.iter(|| decode_body(black_box(form), &schema, &options))
    });

    group.finish();
}

criterion_group!(
    validation_benches,
    bench_pattern_predicates,
    bench_scalar_predicates,
    bench_rule_parsing,
    bench_engine,
    bench_ingestion,
);
criterion_main!(validation_benches);
