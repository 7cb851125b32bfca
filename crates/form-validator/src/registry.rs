//! Type-keyed rule registry and the validation entry points.

use std::collections::HashMap;
use std::sync::Arc;

use form_types::{Field, FieldType, Limit};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{ValidatorError, ValidatorResult};
use crate::outcome::{is_empty_value, FieldValidation};
use crate::rules::{DateRule, EmailRule, MultiChoiceRule, NumberRule, SingleChoiceRule, TextRule};

// ── Rule Trait ──────────────────────────────────────────────────────────

/// Validates non-empty answers for one or more field types.
pub trait ValueRule: Send + Sync {
    /// Name of this rule, for logs.
    fn name(&self) -> &str;

    /// Check a non-empty `value` against `field`'s constraints.
    fn validate(&self, field: &Field, value: &Value) -> FieldValidation;
}

// ── Registry ────────────────────────────────────────────────────────────

/// Rules keyed by field type tag.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    rules: HashMap<String, Arc<dyn ValueRule>>,
}

impl ValidatorRegistry {
    /// An empty registry: every non-empty answer passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in rules for every known field type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let text: Arc<dyn ValueRule> = Arc::new(TextRule);
        let single: Arc<dyn ValueRule> = Arc::new(SingleChoiceRule);

        registry.register_shared(FieldType::ShortText.as_str(), Arc::clone(&text));
        registry.register_shared(FieldType::LongText.as_str(), text);
        registry.register(FieldType::Email.as_str(), EmailRule);
        registry.register(FieldType::Number.as_str(), NumberRule);
        registry.register(FieldType::Date.as_str(), DateRule);
        registry.register_shared(FieldType::Dropdown.as_str(), Arc::clone(&single));
        registry.register_shared(FieldType::MultipleChoice.as_str(), single);
        registry.register(FieldType::CheckboxGroup.as_str(), MultiChoiceRule);
        registry
    }

    /// Add or replace the rule for `type_tag`.
    pub fn register(&mut self, type_tag: impl Into<String>, rule: impl ValueRule + 'static) {
        self.register_shared(type_tag, Arc::new(rule));
    }

    /// Add or replace the rule for `type_tag` with a rule shared between tags.
    pub fn register_shared(&mut self, type_tag: impl Into<String>, rule: Arc<dyn ValueRule>) {
        self.rules.insert(type_tag.into(), rule);
    }

    /// Rule registered for `type_tag`, if any.
    pub fn rule_for(&self, type_tag: &str) -> Option<&dyn ValueRule> {
        self.rules.get(type_tag).map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate one answer. `Value::Null` stands for "no answer".
    pub fn validate(&self, field: &Field, value: &Value) -> FieldValidation {
        if is_empty_value(value) {
            return if field.required {
                FieldValidation::fail(required_message(&field.field_type))
            } else {
                FieldValidation::pass()
            };
        }

        match self.rule_for(field.field_type.as_str()) {
            Some(rule) => {
                let outcome = rule.validate(field, value);
                debug!(
                    field = %field.id,
                    rule = rule.name(),
                    valid = outcome.valid,
                    "Validated answer"
                );
                outcome
            }
            None => FieldValidation::pass(),
        }
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ValidatorRegistry").field("types", &tags).finish()
    }
}

fn required_message(field_type: &FieldType) -> &'static str {
    if field_type.is_multi_choice() {
        "Please select at least one option"
    } else if field_type.is_single_choice() {
        "Please select an option"
    } else {
        "This field is required"
    }
}

lazy_static! {
    pub(crate) static ref DEFAULT_REGISTRY: ValidatorRegistry = ValidatorRegistry::with_defaults();
}

/// Validate one answer with the built-in rules.
pub fn validate_block_data(field: &Field, value: &Value) -> FieldValidation {
    DEFAULT_REGISTRY.validate(field, value)
}

/// Builder-time check that `field`'s constraints can be applied: the
/// pattern compiles and no lower bound exceeds its upper bound.
pub fn check_constraints(field: &Field) -> ValidatorResult<()> {
    let constraints = &field.validation;

    if let Some(pattern) = constraints.pattern.as_deref() {
        Regex::new(pattern).map_err(|e| ValidatorError::InvalidPattern {
            field_id: field.id.clone(),
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
    }

    if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
        if min > max {
            return Err(ValidatorError::InvalidBounds {
                field_id: field.id.clone(),
                reason: format!("minLength {} exceeds maxLength {}", min, max),
            });
        }
    }

    if let (Some(min), Some(max)) = (constraints.min.as_ref(), constraints.max.as_ref()) {
        let inverted = match (min, max) {
            (Limit::Text(lo), Limit::Text(hi)) if field.field_type == FieldType::Date => lo > hi,
            _ => matches!((min.as_f64(), max.as_f64()), (Some(lo), Some(hi)) if lo > hi),
        };
        if inverted {
            return Err(ValidatorError::InvalidBounds {
                field_id: field.id.clone(),
                reason: format!("min {} exceeds max {}", min, max),
            });
        }
    }

    Ok(())
}
