//! Tests for the syntax stage: gross structural well-formedness.
mod common;
use common::*;
use geomsa::prelude::*;
use serde_json::json;

#[test]
fn test_invalid_json_reports_parse_error() {
    let validator = SyntaxValidator::new();
    let report = validator.validate_str("{ not json at all");

    assert!(!report.is_valid());
    assert!(report.data.is_none());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, DiagnosticCode::SyntaxJsonParse);

    let details = report.errors[0].details.as_ref().expect("line/column details");
    assert!(details.get("line").is_some());
    assert!(details.get("column").is_some());
}

#[test]
fn test_root_must_be_an_object() {
    let validator = SyntaxValidator::new();
    let report = validator.validate_value(json!([1, 2, 3]));

    assert!(!report.is_valid());
    assert_eq!(report.errors[0].code, DiagnosticCode::SyntaxRootNotDict);
}

#[test]
fn test_missing_root_keys_are_listed() {
    let validator = SyntaxValidator::new();
    let report = validator.validate_value(json!({ "id": "test_flow" }));

    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.code, DiagnosticCode::SyntaxMissingRootKeys);
    assert!(error.message.contains("name"));
    assert!(error.message.contains("steps"));
    assert_eq!(
        error.details.as_ref().unwrap()["missing_keys"],
        json!(["name", "steps"])
    );
}

#[test]
fn test_steps_must_be_an_array() {
    let validator = SyntaxValidator::new();
    let report = validator.validate_value(json!({
        "id": "test_flow",
        "name": "Test",
        "steps": "not an array"
    }));

    assert!(!report.is_valid());
    assert_eq!(report.errors[0].code, DiagnosticCode::SyntaxStepsNotArray);
    assert_eq!(report.errors[0].location.as_str(), "$.steps");
}

#[test]
fn test_empty_steps_warns_but_passes() {
    let validator = SyntaxValidator::new();
    let report = validator.validate_value(json!({
        "id": "test_flow",
        "name": "Test",
        "steps": []
    }));

    assert!(report.is_valid());
    assert!(report.data.is_some());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].code, DiagnosticCode::SyntaxEmptySteps);
}

#[test]
fn test_step_shape_checked_per_element() {
    let validator = SyntaxValidator::new();
    let report = validator.validate_value(json!({
        "id": "test_flow",
        "name": "Test",
        "steps": [
            "not an object",
            { "name": "no id or type" },
            { "id": "ok_step", "type": "form" }
        ]
    }));

    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0].code, DiagnosticCode::SyntaxStepNotDict);
    assert_eq!(report.errors[0].location.as_str(), "$.steps[0]");
    assert_eq!(report.errors[1].code, DiagnosticCode::SyntaxStepMissingKeys);
    assert_eq!(report.errors[1].location.as_str(), "$.steps[1]");
}

#[test]
fn test_valid_document_passes_unchanged() {
    let validator = SyntaxValidator::new();
    let input = visa_flow();
    let report = validator.validate_value(input.clone());

    assert!(report.is_valid());
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.data, Some(input));
}
