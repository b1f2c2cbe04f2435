use thiserror::Error;

/// Errors produced while parsing a rule's condition expression.
///
/// These are internal to the flow stage's well-formedness check; the
/// pipeline surfaces them as `FLOW_ERROR_INVALID_CONDITION` diagnostics
/// carrying the byte offset in the details payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { offset: usize, ch: char },

    #[error("Unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("Invalid number literal '{literal}' at offset {offset}")]
    InvalidNumber { offset: usize, literal: String },

    #[error("Expected {expected}, found '{found}' at offset {offset}")]
    UnexpectedToken {
        offset: usize,
        found: String,
        expected: &'static str,
    },

    #[error("Expected {expected}, but the expression ended")]
    UnexpectedEnd { expected: &'static str },

    #[error("Trailing input after the expression, starting at offset {offset}")]
    TrailingInput { offset: usize },
}

impl ConditionError {
    /// Byte offset of the failure within the condition string, when known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ConditionError::UnexpectedChar { offset, .. }
            | ConditionError::UnterminatedString { offset }
            | ConditionError::InvalidNumber { offset, .. }
            | ConditionError::UnexpectedToken { offset, .. }
            | ConditionError::TrailingInput { offset } => Some(*offset),
            ConditionError::UnexpectedEnd { .. } => None,
        }
    }
}
