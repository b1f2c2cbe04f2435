//! The four validator stages, in pipeline order.
//!
//! Each stage is a pure function of its input: syntax and schema produce a
//! new payload for the next stage, semantic and flow read the decoded
//! document and pass it through untouched.

pub mod flow;
pub mod schema;
pub mod semantic;
pub mod syntax;

pub use flow::FlowValidator;
pub use schema::SchemaValidator;
pub use semantic::SemanticValidator;
pub use syntax::SyntaxValidator;
