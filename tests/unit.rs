//! Unit tests for the condition parser, diagnostic plumbing and rule
//! target decoding.
use geomsa::prelude::*;

#[test]
fn test_parse_simple_comparison() {
    let expr = parse_condition("payment.amount >= 100").expect("should parse");
    match expr {
        CondExpr::Compare { op, lhs, rhs } => {
            assert_eq!(op, CompareOp::Ge);
            assert_eq!(lhs, Operand::Path("payment.amount".to_string()));
            assert_eq!(rhs, Operand::Number(100.0));
        }
        other => panic!("Expected a comparison, got {:?}", other),
    }
}

#[test]
fn test_parse_string_and_bool_operands() {
    let expr = parse_condition("documents.passport == 'uploaded'").expect("should parse");
    match expr {
        CondExpr::Compare { lhs, rhs, .. } => {
            assert_eq!(lhs, Operand::Path("documents.passport".to_string()));
            assert_eq!(rhs, Operand::Str("uploaded".to_string()));
        }
        other => panic!("Expected a comparison, got {:?}", other),
    }

    parse_condition("payment.waived == true").expect("bool literal should parse");
}

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse_condition("a > 1 || b > 2 && c > 3").expect("should parse");
    match expr {
        CondExpr::Or(lhs, rhs) => {
            assert!(matches!(*lhs, CondExpr::Compare { .. }));
            assert!(matches!(*rhs, CondExpr::And(_, _)));
        }
        other => panic!("Expected Or at the top, got {:?}", other),
    }
}

#[test]
fn test_word_operators_match_symbols() {
    let symbolic = parse_condition("!(a == 1) && b != 2").expect("should parse");
    let worded = parse_condition("not (a == 1) and b != 2").expect("should parse");
    assert_eq!(symbolic, worded);
}

#[test]
fn test_parens_override_precedence() {
    let expr = parse_condition("(a > 1 || b > 2) && c > 3").expect("should parse");
    match expr {
        CondExpr::And(lhs, _) => assert!(matches!(*lhs, CondExpr::Or(_, _))),
        other => panic!("Expected And at the top, got {:?}", other),
    }
}

#[test]
fn test_bare_operand_is_not_a_condition() {
    let err = parse_condition("approved").unwrap_err();
    assert!(matches!(err, ConditionError::UnexpectedEnd { .. }));

    let err = parse_condition("true").unwrap_err();
    assert!(matches!(err, ConditionError::UnexpectedEnd { .. }));
}

#[test]
fn test_unterminated_string() {
    let err = parse_condition("name == 'abc").unwrap_err();
    assert_eq!(err, ConditionError::UnterminatedString { offset: 8 });
}

#[test]
fn test_trailing_input_reports_offset() {
    let err = parse_condition("a > 1 b").unwrap_err();
    assert_eq!(err.offset(), Some(6));
}

#[test]
fn test_unexpected_character() {
    let err = parse_condition("a @ b").unwrap_err();
    assert_eq!(err, ConditionError::UnexpectedChar { offset: 2, ch: '@' });
}

#[test]
fn test_location_builds_json_paths() {
    let loc = Location::root()
        .key("steps")
        .index(2)
        .key("fields")
        .index(0)
        .key("id");
    assert_eq!(loc.as_str(), "$.steps[2].fields[0].id");
}

#[test]
fn test_code_severity_follows_infix() {
    assert_eq!(DiagnosticCode::SyntaxJsonParse.severity(), Severity::Error);
    assert_eq!(DiagnosticCode::SyntaxEmptySteps.severity(), Severity::Warning);
    assert_eq!(
        DiagnosticCode::FlowUnreachableStep.severity(),
        Severity::Warning
    );
    assert_eq!(
        DiagnosticCode::FlowCircularDependency.severity(),
        Severity::Error
    );
}

#[test]
fn test_code_wire_names() {
    assert_eq!(
        DiagnosticCode::SchemaDuplicateStepId.as_str(),
        "SCHEMA_ERROR_DUPLICATE_STEP_ID"
    );
    assert_eq!(
        DiagnosticCode::SemanticValidationIgnored.as_str(),
        "SEMANTIC_WARNING_VALIDATION_IGNORED"
    );
}

#[test]
fn test_rule_target_decoding() {
    assert_eq!(
        RuleTarget::decode("proceed_to_review"),
        RuleTarget::Proceed {
            step_id: "review".to_string()
        }
    );
    assert_eq!(RuleTarget::decode("terminate"), RuleTarget::Terminate);
    assert_eq!(RuleTarget::decode("complete"), RuleTarget::Terminate);
    assert_eq!(
        RuleTarget::decode("escalate_manual"),
        RuleTarget::Other {
            raw: "escalate_manual".to_string()
        }
    );
}

#[test]
fn test_stage_names() {
    assert_eq!(StageKind::Syntax.name(), "syntax");
    assert_eq!(StageKind::Schema.name(), "schema");
    assert_eq!(StageKind::Semantic.name(), "semantic");
    assert_eq!(StageKind::Flow.name(), "flow");
}
