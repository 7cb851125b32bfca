//! Result of validating one answer.

use form_types::Severity;
use serde::Serialize;
use serde_json::Value;

/// Outcome of validating one answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldValidation {
    /// A passing result.
    pub fn pass() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// A failing result with the message shown next to the field.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// `Rejection` for failures, `None` for passes.
    pub fn severity(&self) -> Option<Severity> {
        (!self.valid).then_some(Severity::Rejection)
    }
}

/// Whether an answer counts as "not given": null, a blank string or an
/// empty list.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emptiness() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!("   ")));
        assert!(is_empty_value(&json!([])));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!(["a"])));
    }

    #[test]
    fn passing_result_serializes_without_error() {
        let json = serde_json::to_string(&FieldValidation::pass()).unwrap();
        assert_eq!(json, r#"{"valid":true}"#);
        assert_eq!(FieldValidation::fail("x").severity(), Some(Severity::Rejection));
    }
}
