use crate::report::{StageKind, ValidationReport};
use crate::validator::{FlowValidator, SchemaValidator, SemanticValidator, SyntaxValidator};
use serde_json::Value;

/// Drives the four validator stages in fixed order and aggregates their
/// findings into one [`ValidationReport`].
///
/// Errors are collected exhaustively within a stage but fail fast across
/// stages: the first stage to report an error ends the run, and the report
/// records which stages executed. Warnings never block progression.
///
/// A `Pipeline` holds no per-run state; one instance can validate any
/// number of documents, concurrently if desired.
#[derive(Debug, Default)]
pub struct Pipeline {
    syntax: SyntaxValidator,
    schema: SchemaValidator,
    semantic: SemanticValidator,
    flow: FlowValidator,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            syntax: SyntaxValidator::new(),
            schema: SchemaValidator::new(),
            semantic: SemanticValidator::new(),
            flow: FlowValidator::new(),
        }
    }

    /// Validates raw JSON text.
    pub fn validate(&self, raw: &str) -> ValidationReport {
        self.run(self.syntax.validate_str(raw))
    }

    /// Validates an already-parsed document.
    pub fn validate_value(&self, document: Value) -> ValidationReport {
        self.run(self.syntax.validate_value(document))
    }

    fn run(
        &self,
        syntax_report: crate::report::StageReport<Value>,
    ) -> ValidationReport {
        let mut errors = syntax_report.errors;
        let mut warnings = syntax_report.warnings;
        let mut stages_run = vec![StageKind::Syntax];

        let Some(value) = syntax_report.data else {
            return ValidationReport {
                is_valid: false,
                errors,
                warnings,
                stages_run,
                data: None,
            };
        };

        stages_run.push(StageKind::Schema);
        let schema_report = self.schema.validate(&value);
        errors.extend(schema_report.errors);
        warnings.extend(schema_report.warnings);
        let Some(document) = schema_report.data else {
            return ValidationReport {
                is_valid: false,
                errors,
                warnings,
                stages_run,
                data: None,
            };
        };

        stages_run.push(StageKind::Semantic);
        let semantic_report = self.semantic.validate(&document);
        errors.extend(semantic_report.errors);
        warnings.extend(semantic_report.warnings);
        if semantic_report.data.is_none() {
            return ValidationReport {
                is_valid: false,
                errors,
                warnings,
                stages_run,
                data: None,
            };
        }

        stages_run.push(StageKind::Flow);
        let flow_report = self.flow.validate(&document);
        errors.extend(flow_report.errors);
        warnings.extend(flow_report.warnings);
        if flow_report.data.is_none() {
            return ValidationReport {
                is_valid: false,
                errors,
                warnings,
                stages_run,
                data: None,
            };
        }

        ValidationReport {
            is_valid: true,
            errors,
            warnings,
            stages_run,
            data: Some(document),
        }
    }
}
