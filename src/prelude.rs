//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the geomsa crate. Import
//! this module to get access to the core functionality without having to
//! import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use geomsa::prelude::*;
//!
//! # fn run_example() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = std::fs::read_to_string("path/to/flow.json")?;
//!
//! let pipeline = Pipeline::new();
//! let report = pipeline.validate(&raw);
//!
//! println!("valid: {}", report.is_valid);
//! # Ok(())
//! # }
//! ```

// Pipeline and stages
pub use crate::pipeline::Pipeline;
pub use crate::validator::{FlowValidator, SchemaValidator, SemanticValidator, SyntaxValidator};

// Reports and diagnostics
pub use crate::report::{
    Diagnostic, DiagnosticCode, Location, Severity, StageKind, StageReport, ValidationReport,
};

// Flow document model
pub use crate::flow::{
    Domain, Field, FieldKind, FieldValidation, FlowDocument, Rule, RuleTarget, Step, StepKind,
};

// Condition expressions
pub use crate::condition::{CompareOp, CondExpr, Operand, parse_condition};

// Error types
pub use crate::error::ConditionError;
