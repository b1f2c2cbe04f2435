//! Tests for the semantic stage: ordering and cross-reference consistency.
mod common;
use common::*;
use geomsa::prelude::*;
use serde_json::json;

#[test]
fn test_duplicate_sequence_values() {
    let doc = document(vec![step("a", 1), step("b", 1), step("c", 2)]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(!report.is_valid());
    let error = &report.errors[0];
    assert_eq!(error.code, DiagnosticCode::SemanticDuplicateSequence);
    assert_eq!(error.details.as_ref().unwrap()["step_indexes"], json!([0, 1]));
}

#[test]
fn test_sequence_must_start_at_one() {
    // A single step at sequence 2 violates the start invariant only; there
    // is no gap to report among the values present.
    let doc = document(vec![step("a", 2)]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, DiagnosticCode::SemanticSequenceStart);
}

#[test]
fn test_sequence_gap() {
    let doc = document(vec![step("a", 1), step("b", 2), step("c", 4)]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(!report.is_valid());
    let error = &report.errors[0];
    assert_eq!(error.code, DiagnosticCode::SemanticSequenceGap);
    assert_eq!(error.details.as_ref().unwrap()["after"], json!(2));
    assert_eq!(error.details.as_ref().unwrap()["found"], json!(4));
}

#[test]
fn test_duplicate_and_gap_both_reported() {
    let doc = document(vec![step("a", 1), step("b", 1), step("c", 3)]);

    let report = SemanticValidator::new().validate(&doc);
    let codes: Vec<_> = report.errors.iter().map(|e| e.code).collect();
    assert!(codes.contains(&DiagnosticCode::SemanticDuplicateSequence));
    assert!(codes.contains(&DiagnosticCode::SemanticSequenceGap));
}

#[test]
fn test_pattern_on_non_text_field_warns() {
    let mut checkbox = field("agree_terms", FieldKind::Checkbox);
    checkbox.validation = Some(FieldValidation {
        pattern: Some("^yes$".to_string()),
        ..FieldValidation::default()
    });
    let mut a = step("a", 1);
    a.fields.push(checkbox);
    let doc = document(vec![a]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(report.is_valid(), "pattern mismatch is advisory only");
    assert_eq!(report.warnings.len(), 1);
    let warning = &report.warnings[0];
    assert_eq!(warning.code, DiagnosticCode::SemanticValidationIgnored);
    assert_eq!(
        warning.location.as_str(),
        "$.steps[0].fields[0].validation.pattern"
    );
}

#[test]
fn test_pattern_on_text_input_is_fine() {
    let mut name = field("full_name", FieldKind::TextInput);
    name.validation = Some(FieldValidation {
        pattern: Some("^[a-z ]+$".to_string()),
        ..FieldValidation::default()
    });
    let mut a = step("a", 1);
    a.fields.push(name);
    let doc = document(vec![a]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(report.is_valid());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_dependent_field_must_exist_in_same_step() {
    let mut detail = field("detail", FieldKind::TextInput);
    detail.dependent_on = Some("choice".to_string());
    let mut a = step("a", 1);
    a.fields.push(detail);
    // The referenced field exists, but in a different step.
    let mut b = step("b", 2);
    b.fields.push(field("choice", FieldKind::Dropdown));
    let doc = document(vec![a, b]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(!report.is_valid());
    let error = &report.errors[0];
    assert_eq!(error.code, DiagnosticCode::SemanticMissingDependent);
    assert_eq!(error.location.as_str(), "$.steps[0].fields[0].dependent_on");
}

#[test]
fn test_depends_on_must_reference_existing_step() {
    let mut b = step("b", 2);
    b.depends_on.push("a".to_string());
    b.depends_on.push("ghost".to_string());
    let doc = document(vec![step("a", 1), b]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.code, DiagnosticCode::SemanticMissingStepReference);
    assert_eq!(error.location.as_str(), "$.steps[1].depends_on[1]");
}

#[test]
fn test_proceed_target_must_resolve() {
    let mut a = step("a", 1);
    a.rules.push(proceed_rule("nonexistent"));
    let doc = document(vec![a, step("b", 2)]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(!report.is_valid());
    let error = &report.errors[0];
    assert_eq!(error.code, DiagnosticCode::SemanticInvalidRuleTarget);
    assert_eq!(error.location.as_str(), "$.steps[0].rules[0].then");
}

#[test]
fn test_non_proceed_targets_are_not_resolved() {
    let mut a = step("a", 1);
    a.rules.push(Rule {
        condition: String::new(),
        target: RuleTarget::Terminate,
    });
    a.rules.push(Rule {
        condition: String::new(),
        target: RuleTarget::Other {
            raw: "notify_admin".to_string(),
        },
    });
    let doc = document(vec![a]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(report.is_valid());
    assert!(report.errors.is_empty());
}

#[test]
fn test_consistent_document_passes() {
    let mut a = step("a", 1);
    a.rules.push(proceed_rule("b"));
    let doc = document(vec![a, step("b", 2)]);

    let report = SemanticValidator::new().validate(&doc);
    assert!(report.is_valid());
    assert!(report.warnings.is_empty());
}
