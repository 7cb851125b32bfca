//! Field reference tracking for the delete-field flow.
//!
//! Before a field is deleted the builder asks which logic rules use it.
//! A referenced field is only removed after the author confirms, and then
//! together with every condition and action that names it.

use std::collections::BTreeSet;

use form_types::{FieldId, Form, LogicRule};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IntegrityError, IntegrityResult};

/// Where in a rule a field is referenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// The field is an input: trigger or condition.
    Condition,
    /// The field is the target of an action.
    Action,
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Condition => write!(f, "condition"),
            Self::Action => write!(f, "action"),
        }
    }
}

/// Rules that mention a field.
#[derive(Clone, Debug, Default)]
pub struct FieldReferences<'a> {
    pub is_referenced: bool,
    /// Each referencing rule once, in rule-set order.
    pub rules: Vec<&'a LogicRule>,
    pub reference_types: BTreeSet<ReferenceType>,
}

impl FieldReferences<'_> {
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

fn condition_refs(rule: &LogicRule, field_id: &str) -> bool {
    rule.trigger_field.as_ref().is_some_and(|t| t.as_str() == field_id)
        || rule.conditions.iter().any(|c| c.field_id.as_str() == field_id)
}

fn action_refs(rule: &LogicRule, field_id: &str) -> bool {
    rule.actions.iter().any(|a| a.target.as_str() == field_id)
}

/// Find every rule that uses `field_id` as a condition input, an action
/// target, or both.
pub fn get_field_references<'a>(field_id: &str, form: &'a Form) -> FieldReferences<'a> {
    let mut refs = FieldReferences::default();

    for rule in &form.logic {
        let as_condition = condition_refs(rule, field_id);
        let as_action = action_refs(rule, field_id);
        if as_condition {
            refs.reference_types.insert(ReferenceType::Condition);
        }
        if as_action {
            refs.reference_types.insert(ReferenceType::Action);
        }
        if as_condition || as_action {
            refs.rules.push(rule);
        }
    }
    refs.is_referenced = !refs.rules.is_empty();

    debug!(
        form = %form.id,
        field = field_id,
        rules = refs.rules.len(),
        "Collected field references"
    );
    refs
}

/// Return a new rule set with every reference to `field_id` removed.
///
/// Conditions and actions naming the field are dropped and a matching
/// explicit trigger is cleared. A rule left without conditions or
/// without actions is removed entirely.
pub fn strip_field_references(field_id: &str, rules: &[LogicRule]) -> Vec<LogicRule> {
    rules
        .iter()
        .filter_map(|rule| {
            let mut stripped = rule.clone();
            if stripped
                .trigger_field
                .as_ref()
                .is_some_and(|t| t.as_str() == field_id)
            {
                stripped.trigger_field = None;
            }
            stripped.conditions.retain(|c| c.field_id.as_str() != field_id);
            stripped.actions.retain(|a| a.target.as_str() != field_id);

            if stripped.is_well_formed() {
                Some(stripped)
            } else {
                debug!(rule = %rule.id, field = field_id, "Dropping rule emptied by field deletion");
                None
            }
        })
        .collect()
}

/// How to treat logic references when deleting a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletionMode {
    /// Refuse if any rule references the field. Used before the author
    /// has confirmed.
    RefuseIfReferenced,
    /// The author confirmed: delete the field and strip its references.
    StripReferences,
}

/// Return a copy of `form` without `field_id`.
///
/// Fails with [`IntegrityError::FieldNotFound`] for an unknown field, and
/// with [`IntegrityError::FieldReferenced`] when the field is used by
/// logic and `mode` is [`DeletionMode::RefuseIfReferenced`]. The caller
/// persists the returned form.
pub fn remove_field(form: &Form, field_id: &str, mode: DeletionMode) -> IntegrityResult<Form> {
    let Some(field) = form.field(field_id) else {
        return Err(IntegrityError::FieldNotFound(FieldId::new(field_id)));
    };

    let refs = get_field_references(field_id, form);
    if refs.is_referenced && mode == DeletionMode::RefuseIfReferenced {
        return Err(IntegrityError::FieldReferenced {
            field_id: FieldId::new(field_id),
            rule_count: refs.rule_count(),
        });
    }

    let mut updated = form.clone();
    for page in &mut updated.pages {
        page.fields.retain(|f| f.id.as_str() != field_id);
    }
    if refs.is_referenced {
        updated.logic = strip_field_references(field_id, &form.logic);
    }

    info!(
        form = %form.id,
        field = field_id,
        name = field.display_name(),
        rules_before = form.logic.len(),
        rules_after = updated.logic.len(),
        "Field removed"
    );
    Ok(updated)
}
