use crate::report::{Diagnostic, DiagnosticCode, Diagnostics, Location, StageReport};
use serde_json::{Value, json};

/// Stage 1: gross structural well-formedness.
///
/// Confirms the input parses and has the minimum shape the later stages
/// assume: an object root with `id`, `name` and `steps`, where `steps` is
/// an array of objects each carrying at least `id` and `type`. No business
/// semantics are checked here.
#[derive(Debug, Default)]
pub struct SyntaxValidator;

const REQUIRED_ROOT_KEYS: &[&str] = &["id", "name", "steps"];
const REQUIRED_STEP_KEYS: &[&str] = &["id", "type"];

impl SyntaxValidator {
    pub fn new() -> Self {
        SyntaxValidator
    }

    /// Validates raw JSON text.
    pub fn validate_str(&self, raw: &str) -> StageReport<Value> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.validate_value(value),
            Err(e) => {
                let mut diags = Diagnostics::default();
                diags.push(
                    Diagnostic::new(
                        DiagnosticCode::SyntaxJsonParse,
                        Location::root(),
                        format!("Input is not valid JSON: {}", e),
                    )
                    .with_details(json!({ "line": e.line(), "column": e.column() })),
                );
                diags.into_failed_report()
            }
        }
    }

    /// Validates an already-parsed document.
    pub fn validate_value(&self, value: Value) -> StageReport<Value> {
        let mut diags = Diagnostics::default();
        let root = Location::root();

        let Some(obj) = value.as_object() else {
            diags.push(Diagnostic::new(
                DiagnosticCode::SyntaxRootNotDict,
                root,
                format!("Document root must be an object, found {}", type_name(&value)),
            ));
            return diags.into_failed_report();
        };

        let missing: Vec<&str> = REQUIRED_ROOT_KEYS
            .iter()
            .filter(|k| !obj.contains_key(**k))
            .copied()
            .collect();
        if !missing.is_empty() {
            diags.push(
                Diagnostic::new(
                    DiagnosticCode::SyntaxMissingRootKeys,
                    root.clone(),
                    format!("Document is missing required keys: {}", missing.join(", ")),
                )
                .with_details(json!({ "missing_keys": missing })),
            );
        }

        if let Some(steps) = obj.get("steps") {
            let steps_loc = root.key("steps");
            match steps.as_array() {
                None => {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SyntaxStepsNotArray,
                        steps_loc,
                        format!("'steps' must be an array, found {}", type_name(steps)),
                    ));
                }
                Some(elements) => {
                    if elements.is_empty() {
                        diags.push(Diagnostic::new(
                            DiagnosticCode::SyntaxEmptySteps,
                            steps_loc.clone(),
                            "The flow defines no steps",
                        ));
                    }
                    for (idx, element) in elements.iter().enumerate() {
                        self.check_step_shape(element, &steps_loc.index(idx), &mut diags);
                    }
                }
            }
        }

        diags.into_report(value)
    }

    fn check_step_shape(&self, element: &Value, loc: &Location, diags: &mut Diagnostics) {
        let Some(step) = element.as_object() else {
            diags.push(Diagnostic::new(
                DiagnosticCode::SyntaxStepNotDict,
                loc.clone(),
                format!("Each step must be an object, found {}", type_name(element)),
            ));
            return;
        };

        let missing: Vec<&str> = REQUIRED_STEP_KEYS
            .iter()
            .filter(|k| !step.contains_key(**k))
            .copied()
            .collect();
        if !missing.is_empty() {
            diags.push(
                Diagnostic::new(
                    DiagnosticCode::SyntaxStepMissingKeys,
                    loc.clone(),
                    format!("Step is missing required keys: {}", missing.join(", ")),
                )
                .with_details(json!({ "missing_keys": missing })),
            );
        }
    }
}

/// Human name of a JSON value's type, for messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
