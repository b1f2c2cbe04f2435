use crate::flow::FlowDocument;
use serde::{Serialize, Serializer};
use std::fmt;

/// How serious a diagnostic is. Errors fail the stage that produced them;
/// warnings never affect validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable machine-readable identifiers for every diagnostic the pipeline
/// can emit. The wire form is the SCREAMING_SNAKE code string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Syntax stage
    SyntaxJsonParse,
    SyntaxRootNotDict,
    SyntaxMissingRootKeys,
    SyntaxStepsNotArray,
    SyntaxEmptySteps,
    SyntaxStepNotDict,
    SyntaxStepMissingKeys,

    // Schema stage
    SchemaViolation,
    SchemaIdFormat,
    SchemaDuplicateStepId,
    SchemaDuplicateFieldId,

    // Semantic stage
    SemanticDuplicateSequence,
    SemanticSequenceStart,
    SemanticSequenceGap,
    SemanticValidationIgnored,
    SemanticMissingDependent,
    SemanticMissingStepReference,
    SemanticInvalidRuleTarget,

    // Flow stage
    FlowCircularDependency,
    FlowUnreachableStep,
    FlowNoFinalStep,
    FlowInvalidCondition,
    FlowNoCompletionRule,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::SyntaxJsonParse => "SYNTAX_ERROR_JSON_PARSE",
            DiagnosticCode::SyntaxRootNotDict => "SYNTAX_ERROR_ROOT_NOT_DICT",
            DiagnosticCode::SyntaxMissingRootKeys => "SYNTAX_ERROR_MISSING_ROOT_KEYS",
            DiagnosticCode::SyntaxStepsNotArray => "SYNTAX_ERROR_STEPS_NOT_ARRAY",
            DiagnosticCode::SyntaxEmptySteps => "SYNTAX_WARNING_EMPTY_STEPS",
            DiagnosticCode::SyntaxStepNotDict => "SYNTAX_ERROR_STEP_NOT_DICT",
            DiagnosticCode::SyntaxStepMissingKeys => "SYNTAX_ERROR_STEP_MISSING_KEYS",
            DiagnosticCode::SchemaViolation => "SCHEMA_ERROR",
            DiagnosticCode::SchemaIdFormat => "SCHEMA_ERROR_ID_FORMAT",
            DiagnosticCode::SchemaDuplicateStepId => "SCHEMA_ERROR_DUPLICATE_STEP_ID",
            DiagnosticCode::SchemaDuplicateFieldId => "SCHEMA_ERROR_DUPLICATE_FIELD_ID",
            DiagnosticCode::SemanticDuplicateSequence => "SEMANTIC_ERROR_DUPLICATE_SEQUENCE",
            DiagnosticCode::SemanticSequenceStart => "SEMANTIC_ERROR_SEQUENCE_START",
            DiagnosticCode::SemanticSequenceGap => "SEMANTIC_ERROR_SEQUENCE_GAP",
            DiagnosticCode::SemanticValidationIgnored => "SEMANTIC_WARNING_VALIDATION_IGNORED",
            DiagnosticCode::SemanticMissingDependent => "SEMANTIC_ERROR_MISSING_DEPENDENT",
            DiagnosticCode::SemanticMissingStepReference => "SEMANTIC_ERROR_MISSING_STEP_REFERENCE",
            DiagnosticCode::SemanticInvalidRuleTarget => "SEMANTIC_ERROR_INVALID_RULE_TARGET",
            DiagnosticCode::FlowCircularDependency => "FLOW_ERROR_CIRCULAR_DEPENDENCY",
            DiagnosticCode::FlowUnreachableStep => "FLOW_WARNING_UNREACHABLE_STEP",
            DiagnosticCode::FlowNoFinalStep => "FLOW_WARNING_NO_FINAL_STEP",
            DiagnosticCode::FlowInvalidCondition => "FLOW_ERROR_INVALID_CONDITION",
            DiagnosticCode::FlowNoCompletionRule => "FLOW_WARNING_NO_COMPLETION_RULE",
        }
    }

    /// Severity is intrinsic to the code: `_WARNING_` codes advise,
    /// everything else fails its stage.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::SyntaxEmptySteps
            | DiagnosticCode::SemanticValidationIgnored
            | DiagnosticCode::FlowUnreachableStep
            | DiagnosticCode::FlowNoFinalStep
            | DiagnosticCode::FlowNoCompletionRule => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A JSONPath-style pointer into the document being validated,
/// e.g. `$.steps[2].fields[0].id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn root() -> Self {
        Location("$".to_string())
    }

    pub fn key(&self, name: &str) -> Self {
        Location(format!("{}.{}", self.0, name))
    }

    pub fn index(&self, idx: usize) -> Self {
        Location(format!("{}[{}]", self.0, idx))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One finding from one validator stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub severity: Severity,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            severity: code.severity(),
            location,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Accumulator used inside a stage. Findings are routed by severity so a
/// stage can keep pushing without re-deriving error/warning splits.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Finalizes the stage. The payload is only carried forward when the
    /// stage produced zero errors.
    pub fn into_report<T>(self, data: T) -> StageReport<T> {
        let data = if self.errors.is_empty() {
            Some(data)
        } else {
            None
        };
        StageReport {
            errors: self.errors,
            warnings: self.warnings,
            data,
        }
    }

    pub fn into_failed_report<T>(self) -> StageReport<T> {
        StageReport {
            errors: self.errors,
            warnings: self.warnings,
            data: None,
        }
    }
}

/// The outcome of a single validator stage.
#[derive(Debug)]
pub struct StageReport<T> {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub data: Option<T>,
}

impl<T> StageReport<T> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The four validator stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Syntax,
    Schema,
    Semantic,
    Flow,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Syntax => "syntax",
            StageKind::Schema => "schema",
            StageKind::Semantic => "semantic",
            StageKind::Flow => "flow",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for StageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// The aggregated result of one full pipeline run.
///
/// Serializes to the boundary contract consumed by callers: `is_valid`,
/// `errors`, `warnings`, `validation_stages` (the stages that actually
/// executed) and `data` (the validated document, absent when invalid).
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    #[serde(rename = "validation_stages")]
    pub stages_run: Vec<StageKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FlowDocument>,
}

impl ValidationReport {
    /// Count of error diagnostics contributed by a given stage, judged by
    /// the code prefix. Used for per-stage summaries in diagnostics output.
    pub fn errors_for_stage(&self, stage: StageKind) -> usize {
        let prefix = match stage {
            StageKind::Syntax => "SYNTAX_",
            StageKind::Schema => "SCHEMA_",
            StageKind::Semantic => "SEMANTIC_",
            StageKind::Flow => "FLOW_",
        };
        self.errors
            .iter()
            .filter(|e| e.code.as_str().starts_with(prefix))
            .count()
    }
}
