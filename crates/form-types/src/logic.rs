//! Conditional logic rules.
//!
//! A rule fires when its conditions match and then applies its actions.
//! Only `jump` and `skip` change navigation; `show`, `hide` and
//! `set_value` act on a field without moving the respondent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{FieldId, RuleId};

/// Comparison applied by a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

/// A single comparison against a field's answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Field whose answer is compared.
    pub field_id: FieldId,
    pub operator: ConditionOperator,
    /// Comparison value; unused by `is_empty` / `is_not_empty`.
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field_id: impl Into<FieldId>, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value,
        }
    }
}

/// What an action does to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Show,
    Hide,
    Jump,
    Skip,
    SetValue,
}

impl ActionKind {
    /// Whether this action moves the respondent and therefore forms an
    /// edge of the navigation graph.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Jump | Self::Skip)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Jump => "jump",
            Self::Skip => "skip",
            Self::SetValue => "set_value",
        };
        write!(f, "{}", name)
    }
}

/// An effect applied when a rule fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogicAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Field the action applies to.
    pub target: FieldId,
    /// Value written by `set_value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl LogicAction {
    pub fn new(kind: ActionKind, target: impl Into<FieldId>) -> Self {
        Self {
            kind,
            target: target.into(),
            value: None,
        }
    }

    pub fn set_value(target: impl Into<FieldId>, value: Value) -> Self {
        Self {
            kind: ActionKind::SetValue,
            target: target.into(),
            value: Some(value),
        }
    }
}

/// A conditional logic rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicRule {
    pub id: RuleId,
    /// Field the rule is attached to. Rules persisted before this was
    /// recorded explicitly fall back to the first condition's field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_field: Option<FieldId>,
    pub conditions: Vec<Condition>,
    pub actions: Vec<LogicAction>,
}

impl LogicRule {
    /// Create an empty rule. Add conditions and actions with `when` / `then`.
    pub fn new(id: impl Into<RuleId>) -> Self {
        Self {
            id: id.into(),
            trigger_field: None,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_trigger(mut self, field_id: impl Into<FieldId>) -> Self {
        self.trigger_field = Some(field_id.into());
        self
    }

    pub fn when(
        mut self,
        field_id: impl Into<FieldId>,
        operator: ConditionOperator,
        value: Value,
    ) -> Self {
        self.conditions.push(Condition::new(field_id, operator, value));
        self
    }

    pub fn then(mut self, kind: ActionKind, target: impl Into<FieldId>) -> Self {
        self.actions.push(LogicAction::new(kind, target));
        self
    }

    /// The field that triggers this rule: the explicit trigger when set,
    /// otherwise the field of the first condition.
    pub fn trigger(&self) -> Option<&FieldId> {
        self.trigger_field
            .as_ref()
            .or_else(|| self.conditions.first().map(|c| &c.field_id))
    }

    /// Targets of `jump` / `skip` actions, in declaration order.
    pub fn navigation_targets(&self) -> impl Iterator<Item = &FieldId> {
        self.actions
            .iter()
            .filter(|a| a.kind.is_navigation())
            .map(|a| &a.target)
    }

    /// A rule needs at least one condition and one action to mean anything.
    pub fn is_well_formed(&self) -> bool {
        !self.conditions.is_empty() && !self.actions.is_empty()
    }
}
