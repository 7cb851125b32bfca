//! Error types for constraint checking.

use form_types::FieldId;
use thiserror::Error;

/// A field's declared constraints cannot be applied.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The `pattern` constraint is not a valid regular expression.
    #[error("field {field_id}: invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        field_id: FieldId,
        pattern: String,
        reason: String,
    },

    /// A lower bound exceeds its upper bound, or a bound has the wrong shape.
    #[error("field {field_id}: invalid bounds: {reason}")]
    InvalidBounds { field_id: FieldId, reason: String },
}

/// Convenience result type for constraint checking.
pub type ValidatorResult<T> = Result<T, ValidatorError>;
