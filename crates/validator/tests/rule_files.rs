//! Integration tests for rule files applied to JSON documents.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rampart_validator::foundation::ServiceError;
use rampart_validator::prelude::*;
use serde_json::json;

const SIGNUP_RULES: &str = r#"
[[fields.username]]
type = "not_blank"

[[fields.username]]
type = "length"
min = 3
max = 12

[[fields.email]]
type = "email"

[[fields.password]]
type = "not_compromised_password"

[[fields.password]]
type = "length"
min = 8
groups = ["strict"]

[[fields.password_repeat]]
type = "comparison"
operator = "equal_to"
property_path = "password"

[[fields.iban]]
type = "iban"

[[fields.bic]]
type = "bic"
iban_property_path = "iban"

[[fields.tags]]
type = "each"
constraints = [{ type = "length", max = 5 }]
"#;

/// Breach corpus that only knows the password `password`.
fn services() -> Services {
    Services::default().with_breach_checker(|prefix: &str| {
        let body = if prefix == "5BAA6" {
            "1E4C9B93F3F0682250B6CF8331B7EE68FD8:3730471"
        } else {
            ""
        };
        Ok::<_, ServiceError>(body.to_owned())
    })
}

fn validate(document: serde_json::Value, groups: &[&str]) -> Vec<(String, String)> {
    let rules = ConstraintSet::from_toml_str(SIGNUP_RULES).unwrap();
    let validator = Validator::builder().services(services()).build();
    validator
        .validate_object(&document.into(), &rules, groups)
        .unwrap()
        .iter()
        .map(|v| {
            let name = rampart_validator::codes::error_name(v.code().unwrap_or_default());
            (v.property_path().to_owned(), name.unwrap_or("?").to_owned())
        })
        .collect()
}

// ============================================================================
// FULL DOCUMENTS
// ============================================================================

#[test]
fn valid_document_has_no_violations() {
    let violations = validate(
        json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct horse",
            "password_repeat": "correct horse",
            "iban": "DE89 3704 0044 0532 0130 00",
            "bic": "COBADEFFXXX",
            "tags": ["a", "b"],
        }),
        &[],
    );
    assert_eq!(violations, Vec::<(String, String)>::new());
}

#[test]
fn every_field_reports_under_its_path() {
    let violations = validate(
        json!({
            "username": "al",
            "email": "not-an-email",
            "password": "password",
            "password_repeat": "passw0rd",
            "iban": "DE89 3704 0044 0532 0130 00",
            "bic": "BNPAFRPP",
            "tags": ["short", "toolong"],
        }),
        &[],
    );
    let expected: Vec<(String, String)> = [
        ("username", "TOO_SHORT_ERROR"),
        ("email", "INVALID_FORMAT_ERROR"),
        ("password", "COMPROMISED_PASSWORD_ERROR"),
        ("password_repeat", "NOT_EQUAL_ERROR"),
        ("bic", "INVALID_IBAN_COUNTRY_CODE_ERROR"),
        ("tags[1]", "TOO_LONG_ERROR"),
    ]
    .into_iter()
    .map(|(p, n)| (p.to_owned(), n.to_owned()))
    .collect();
    assert_eq!(violations, expected);
}

#[test]
fn strict_group_runs_only_its_rules() {
    let violations = validate(
        json!({ "username": "", "password": "short" }),
        &["strict"],
    );
    assert_eq!(
        violations,
        vec![("password".to_owned(), "TOO_SHORT_ERROR".to_owned())]
    );
}

#[test]
fn missing_fields_are_validated_as_null() {
    let violations = validate(json!({}), &[]);
    assert_eq!(
        violations,
        vec![("username".to_owned(), "IS_BLANK_ERROR".to_owned())]
    );
}

// ============================================================================
// CONDITIONAL RULES
// ============================================================================

#[test]
fn when_rules_use_the_injected_evaluator() {
    let rules = ConstraintSet::from_json_str(
        r#"{
            "fields": {
                "vat_id": [{
                    "type": "when",
                    "expression": "this.company",
                    "constraints": [{ "type": "not_blank" }],
                    "otherwise": [{ "type": "blank" }]
                }]
            }
        }"#,
    )
    .unwrap();
    let services = Services::empty().with_expression_evaluator(
        |expression: &str, variables: &IndexMap<String, Value>| {
            let property = expression.trim_start_matches("this.");
            Ok::<_, ServiceError>(variables["this"].lookup(property).cloned().unwrap_or_default())
        },
    );
    let validator = Validator::builder().services(services).build();

    let company: Value = json!({ "company": true, "vat_id": "" }).into();
    let violations = validator.validate_object(&company, &rules, &[]).unwrap();
    assert_eq!(violations.codes(), vec![NotBlank::IS_BLANK_ERROR]);

    let person: Value = json!({ "company": false, "vat_id": "DE123" }).into();
    let violations = validator.validate_object(&person, &rules, &[]).unwrap();
    assert_eq!(violations.codes(), vec![Blank::NOT_BLANK_ERROR]);
}

#[test]
fn when_without_evaluator_is_an_error() {
    let rules = ConstraintSet::from_json_str(
        r#"{ "fields": { "x": [{ "type": "when", "expression": "true", "constraints": [{ "type": "not_null" }] }] } }"#,
    )
    .unwrap();
    let err = Validator::new()
        .validate_object(&json!({ "x": 1 }).into(), &rules, &[])
        .unwrap_err();
    assert!(matches!(err, ValidatorError::MissingService { .. }));
}

// ============================================================================
// DEFINITION ERRORS
// ============================================================================

#[test]
fn bad_rules_never_load() {
    for source in [
        r#"{ "fields": { "a": [{ "type": "length" }] } }"#,
        r#"{ "fields": { "a": [{ "type": "range", "min": 1, "min_property_path": "b" }] } }"#,
        r#"{ "fields": { "a": [{ "type": "regex", "pattern": "[" }] } }"#,
        r#"{ "fields": { "a": [{ "type": "date_time", "format": "" }] } }"#,
        r#"{ "fields": { "a": [{ "type": "composite", "policy": "any_of", "constraints": [] }] } }"#,
        r#"{ "fields": { "a": [{ "type": "composite", "policy": "all_of", "groups": ["x"], "constraints": [{ "type": "not_null", "groups": ["y"] }] }] } }"#,
        r#"{ "fields": { "a": [{ "type": "no_such_constraint" }] } }"#,
    ] {
        assert!(ConstraintSet::from_json_str(source).is_err(), "{source}");
    }
}

#[test]
fn unresolvable_property_path_is_an_error() {
    let rules = ConstraintSet::new().with_field(
        "confirm",
        vec![Comparison::with_property_path(ComparisonOperator::EqualTo, "missing").into()],
    );
    let err = Validator::new()
        .validate_object(&json!({ "confirm": "x" }).into(), &rules, &[])
        .unwrap_err();
    assert!(matches!(err, ValidatorError::Definition(DefinitionError::InvalidPropertyPath { .. })));
}
