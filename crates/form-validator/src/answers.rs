//! Page-advance and final-submit validation over an answer set.

use std::collections::{BTreeMap, HashMap};

use form_types::{FieldId, Form, Page};
use serde_json::Value;
use tracing::debug;

use crate::registry::{ValidatorRegistry, DEFAULT_REGISTRY};

/// Error message per failing field.
pub type AnswerErrors = BTreeMap<FieldId, String>;

impl ValidatorRegistry {
    /// Validate every field on `page`. Missing answers count as empty.
    pub fn validate_page(&self, page: &Page, answers: &HashMap<FieldId, Value>) -> AnswerErrors {
        let errors: AnswerErrors = page
            .fields
            .iter()
            .filter_map(|field| {
                let value = answers.get(&field.id).unwrap_or(&Value::Null);
                let outcome = self.validate(field, value);
                outcome.error.map(|e| (field.id.clone(), e))
            })
            .collect();
        debug!(page = %page.id, failing = errors.len(), "Validated page");
        errors
    }

    /// Validate every field on every page of `form`.
    pub fn validate_answers(&self, form: &Form, answers: &HashMap<FieldId, Value>) -> AnswerErrors {
        form.pages
            .iter()
            .flat_map(|page| self.validate_page(page, answers))
            .collect()
    }
}

/// [`ValidatorRegistry::validate_page`] with the built-in rules.
pub fn validate_page(page: &Page, answers: &HashMap<FieldId, Value>) -> AnswerErrors {
    DEFAULT_REGISTRY.validate_page(page, answers)
}

/// [`ValidatorRegistry::validate_answers`] with the built-in rules.
pub fn validate_answers(form: &Form, answers: &HashMap<FieldId, Value>) -> AnswerErrors {
    DEFAULT_REGISTRY.validate_answers(form, answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_types::{Field, FieldType};
    use serde_json::json;

    fn form() -> Form {
        Form::new("signup", "Sign up")
            .with_page(Page::new(
                "p1",
                vec![
                    Field::new("name", FieldType::ShortText).required(),
                    Field::new("email", FieldType::Email).required(),
                ],
            ))
            .with_page(Page::new(
                "p2",
                vec![
                    Field::new("plan", FieldType::Dropdown)
                        .required()
                        .with_options(["free", "pro"]),
                    Field::new("referral", FieldType::ShortText),
                ],
            ))
    }

    fn answers(pairs: &[(&str, Value)]) -> HashMap<FieldId, Value> {
        pairs
            .iter()
            .map(|(k, v)| (FieldId::new(*k), v.clone()))
            .collect()
    }

    #[test]
    fn page_reports_only_its_own_fields() {
        let form = form();
        let errors = validate_page(&form.pages[0], &answers(&[("name", json!("Ada"))]));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("email").map(String::as_str),
            Some("This field is required")
        );
    }

    #[test]
    fn full_form_collects_every_failure() {
        let form = form();
        let errors = validate_answers(
            &form,
            &answers(&[("email", json!("nope")), ("plan", json!("enterprise"))]),
        );
        let failing: Vec<&str> = errors.keys().map(FieldId::as_str).collect();
        assert_eq!(failing, vec!["email", "name", "plan"]);
        assert_eq!(errors.get("plan").map(String::as_str), Some("Invalid selection"));
    }

    #[test]
    fn complete_answers_pass() {
        let form = form();
        let errors = validate_answers(
            &form,
            &answers(&[
                ("name", json!("Ada")),
                ("email", json!("ada@example.com")),
                ("plan", json!("pro")),
            ]),
        );
        assert!(errors.is_empty());
    }
}
