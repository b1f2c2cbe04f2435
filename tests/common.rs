//! Common test utilities: JSON fixtures for full-pipeline tests and typed
//! builders for exercising the later stages directly.
use geomsa::prelude::*;
use serde_json::{Value, json};

/// A complete, valid visa-application flow. Passes all four stages with no
/// errors and no warnings.
#[allow(dead_code)]
pub fn visa_flow() -> Value {
    json!({
        "id": "visa_application",
        "name": "Visa Application",
        "domain": "visa",
        "steps": [
            {
                "id": "personal_info",
                "name": "Personal Information",
                "type": "form",
                "sequence": 1,
                "fields": [
                    {
                        "id": "full_name",
                        "name": "Full Name",
                        "type": "text_input",
                        "required": true,
                        "validation": { "pattern": "^[a-zA-Z ]+$", "min_length": 2, "max_length": 80 }
                    },
                    {
                        "id": "visa_type",
                        "name": "Visa Type",
                        "type": "dropdown",
                        "required": true
                    },
                    {
                        "id": "other_detail",
                        "name": "Other Visa Detail",
                        "type": "text_input",
                        "required": false,
                        "dependent_on": "visa_type"
                    }
                ],
                "rules": [
                    { "condition": "", "then": "proceed_to_upload_documents" }
                ]
            },
            {
                "id": "upload_documents",
                "name": "Upload Documents",
                "type": "process",
                "sequence": 2,
                "auto_proceed": false,
                "rules": [
                    {
                        "condition": "documents.passport == 'uploaded' && documents.photo == 'uploaded'",
                        "then": "proceed_to_review"
                    }
                ]
            },
            {
                "id": "review",
                "name": "Review and Submit",
                "type": "decision",
                "sequence": 3,
                "final_step": true
            }
        ]
    })
}

/// A syntactically-minimal step object for shape-level tests.
#[allow(dead_code)]
pub fn step_json(id: &str, sequence: u32) -> Value {
    json!({
        "id": id,
        "name": id,
        "type": "process",
        "sequence": sequence
    })
}

/// Wraps steps in an otherwise-valid document.
#[allow(dead_code)]
pub fn doc_json(steps: Vec<Value>) -> Value {
    json!({
        "id": "test_flow",
        "name": "Test Flow",
        "domain": "enrollment",
        "steps": steps
    })
}

/// Typed step builder for driving the semantic and flow stages directly.
#[allow(dead_code)]
pub fn step(id: &str, sequence: u32) -> Step {
    Step {
        id: id.to_string(),
        name: id.to_string(),
        kind: StepKind::Process,
        sequence,
        fields: Vec::new(),
        rules: Vec::new(),
        depends_on: Vec::new(),
        final_step: false,
        auto_proceed: None,
    }
}

#[allow(dead_code)]
pub fn document(steps: Vec<Step>) -> FlowDocument {
    FlowDocument {
        id: "test_flow".to_string(),
        name: "Test Flow".to_string(),
        domain: Domain::Enrollment,
        steps,
    }
}

/// An unconditional rule proceeding to the given step.
#[allow(dead_code)]
pub fn proceed_rule(target: &str) -> Rule {
    Rule {
        condition: String::new(),
        target: RuleTarget::Proceed {
            step_id: target.to_string(),
        },
    }
}

#[allow(dead_code)]
pub fn field(id: &str, kind: FieldKind) -> Field {
    Field {
        id: id.to_string(),
        name: id.to_string(),
        kind,
        required: false,
        validation: None,
        dependent_on: None,
    }
}
