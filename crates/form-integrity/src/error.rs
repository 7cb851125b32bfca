//! Error types for integrity operations.

use form_types::FieldId;
use thiserror::Error;

/// Errors from operations that can refuse to proceed.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The field does not exist on any page.
    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    /// Deletion was requested without confirming that logic references
    /// to the field may be stripped.
    #[error("field {field_id} is referenced by {rule_count} logic rule(s)")]
    FieldReferenced { field_id: FieldId, rule_count: usize },
}

/// Convenience result type for integrity operations.
pub type IntegrityResult<T> = Result<T, IntegrityError>;
