use crate::flow::{FieldKind, FlowDocument, RuleTarget};
use crate::report::{Diagnostic, DiagnosticCode, Diagnostics, Location, StageReport};
use ahash::AHashSet;
use itertools::Itertools;
use serde_json::json;

/// Stage 3: consistency rules a type schema cannot express.
///
/// Checks the step ordering invariant (`sequence` values form exactly
/// `{1, ..., N}`), intra-step field references, step references and the
/// resolution of decoded rule targets against the document's step set.
/// The document is read-only throughout and passes through untouched.
#[derive(Debug, Default)]
pub struct SemanticValidator;

impl SemanticValidator {
    pub fn new() -> Self {
        SemanticValidator
    }

    pub fn validate(&self, document: &FlowDocument) -> StageReport<()> {
        let mut diags = Diagnostics::default();
        let steps_loc = Location::root().key("steps");

        self.check_sequences(document, &steps_loc, &mut diags);

        let step_ids: AHashSet<&str> = document.steps.iter().map(|s| s.id.as_str()).collect();

        for (step_idx, step) in document.steps.iter().enumerate() {
            let step_loc = steps_loc.index(step_idx);

            let field_ids: AHashSet<&str> = step.fields.iter().map(|f| f.id.as_str()).collect();
            for (field_idx, field) in step.fields.iter().enumerate() {
                let field_loc = step_loc.key("fields").index(field_idx);

                // Pattern constraints only apply to free-text input.
                if field.kind != FieldKind::TextInput
                    && field
                        .validation
                        .as_ref()
                        .is_some_and(|v| v.pattern.is_some())
                {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SemanticValidationIgnored,
                        field_loc.key("validation").key("pattern"),
                        format!(
                            "Field '{}' has a pattern constraint, but its type is not text_input; the pattern will be ignored",
                            field.id
                        ),
                    ));
                }

                if let Some(dependent_on) = &field.dependent_on
                    && !field_ids.contains(dependent_on.as_str())
                {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SemanticMissingDependent,
                        field_loc.key("dependent_on"),
                        format!(
                            "Field '{}' depends on field '{}', which does not exist in step '{}'",
                            field.id, dependent_on, step.id
                        ),
                    ));
                }
            }

            for (dep_idx, dep) in step.depends_on.iter().enumerate() {
                if !step_ids.contains(dep.as_str()) {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SemanticMissingStepReference,
                        step_loc.key("depends_on").index(dep_idx),
                        format!(
                            "Step '{}' depends on step '{}', which does not exist",
                            step.id, dep
                        ),
                    ));
                }
            }

            for (rule_idx, rule) in step.rules.iter().enumerate() {
                if let RuleTarget::Proceed { step_id } = &rule.target
                    && !step_ids.contains(step_id.as_str())
                {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SemanticInvalidRuleTarget,
                        step_loc.key("rules").index(rule_idx).key("then"),
                        format!(
                            "Rule in step '{}' proceeds to step '{}', which does not exist",
                            step.id, step_id
                        ),
                    ));
                }
            }
        }

        diags.into_report(())
    }

    /// Sequence values across all steps must form a contiguous run 1..N
    /// with no duplicates.
    fn check_sequences(
        &self,
        document: &FlowDocument,
        steps_loc: &Location,
        diags: &mut Diagnostics,
    ) {
        if document.steps.is_empty() {
            return;
        }

        let sequences: Vec<u32> = document.steps.iter().map(|s| s.sequence).collect();

        for value in sequences.iter().sorted().dedup_with_count().filter_map(
            |(count, value)| (count > 1).then_some(value),
        ) {
            let indexes: Vec<usize> = document
                .steps
                .iter()
                .positions(|s| s.sequence == *value)
                .collect();
            diags.push(
                Diagnostic::new(
                    DiagnosticCode::SemanticDuplicateSequence,
                    steps_loc.clone(),
                    format!("Sequence value {} is used by more than one step", value),
                )
                .with_details(json!({ "sequence": value, "step_indexes": indexes })),
            );
        }

        let unique: Vec<u32> = sequences.iter().copied().sorted().dedup().collect();

        if unique[0] != 1 {
            diags.push(Diagnostic::new(
                DiagnosticCode::SemanticSequenceStart,
                steps_loc.clone(),
                format!("Step sequences must start at 1, found {}", unique[0]),
            ));
        }

        for (prev, next) in unique.iter().tuple_windows() {
            if *next > prev + 1 {
                diags.push(
                    Diagnostic::new(
                        DiagnosticCode::SemanticSequenceGap,
                        steps_loc.clone(),
                        format!("Step sequences jump from {} to {}", prev, next),
                    )
                    .with_details(json!({ "after": prev, "found": next })),
                );
            }
        }
    }
}
