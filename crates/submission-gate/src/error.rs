//! Error types for the submission gate.

use thiserror::Error;

/// Errors from gate construction and maintenance.
///
/// A rejected submission is a [`crate::GateDecision`], not an error.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration failed validation.
    #[error("invalid gate config: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Gate state lock was poisoned by a panicking thread.
    #[error("gate state lock poisoned")]
    LockPoisoned,
}

/// Convenience result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_config() {
        let err = GateError::InvalidConfig("ipLimit.windowMs must be positive".into());
        assert_eq!(
            err.to_string(),
            "invalid gate config: ipLimit.windowMs must be positive"
        );
    }

    #[test]
    fn parse_errors_convert() {
        let err: GateError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("config parse error"));
    }
}
