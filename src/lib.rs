//! # Geomsa - Staged Flow Validation Engine
//!
//! **Geomsa** validates declarative multi-step flow definitions (visa
//! applications, enrollment workflows, payment flows) before they reach
//! downstream consumers. A flow is a JSON document of ordered steps, each
//! carrying input fields and conditional transition rules; geomsa checks it
//! with four independent validator stages run strictly in order:
//!
//! 1. **Syntax** — the input parses and has the minimum processable shape.
//! 2. **Schema** — types, required keys, enumerations and uniqueness
//!    constraints against a fixed declarative schema; on success the raw
//!    JSON is decoded once into the typed [`flow::FlowDocument`] model.
//! 3. **Semantic** — ordering and cross-reference consistency: contiguous
//!    step sequences, resolvable field dependencies and rule targets.
//! 4. **Flow** — the step graph as a whole: cycle detection, reachability
//!    from the entry step, terminal-state presence and condition
//!    well-formedness.
//!
//! Each stage collects every violation it finds before returning; the
//! pipeline stops at the first stage that reports an error. Warnings are
//! advisory and never affect validity.
//!
//! ## Quick Start
//!
//! ```rust
//! use geomsa::prelude::*;
//!
//! let raw = r#"{
//!     "id": "visa_application",
//!     "name": "Visa Application",
//!     "domain": "visa",
//!     "steps": [
//!         {
//!             "id": "personal_info",
//!             "name": "Personal Information",
//!             "type": "form",
//!             "sequence": 1,
//!             "rules": [
//!                 { "condition": "", "then": "proceed_to_review" }
//!             ]
//!         },
//!         {
//!             "id": "review",
//!             "name": "Review",
//!             "type": "decision",
//!             "sequence": 2,
//!             "final_step": true
//!         }
//!     ]
//! }"#;
//!
//! let pipeline = Pipeline::new();
//! let report = pipeline.validate(raw);
//!
//! assert!(report.is_valid);
//! for warning in &report.warnings {
//!     println!("{}: {} ({})", warning.code, warning.message, warning.location);
//! }
//!
//! // The decoded document is available once all four stages pass.
//! let document = report.data.expect("valid flows carry their document");
//! assert_eq!(document.steps.len(), 2);
//! ```

pub mod condition;
pub mod error;
pub mod flow;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod validator;
