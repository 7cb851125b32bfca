//! Fields: the unit of input on a form page.

use serde::{Deserialize, Serialize};

use crate::ids::FieldId;

// ── Field Type ──────────────────────────────────────────────────────────

/// Field type tag.
///
/// Known tags get their own variant; anything else round-trips through
/// `Custom` so that new field types can be introduced by the builder
/// without touching this enum.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text.
    ShortText,
    /// Multi-line text.
    LongText,
    /// Email address.
    Email,
    /// Numeric input.
    Number,
    /// ISO-8601 date.
    Date,
    /// Single selection from a dropdown.
    Dropdown,
    /// Single selection from radio options.
    MultipleChoice,
    /// Any number of selections from checkboxes.
    CheckboxGroup,
    /// A tag this crate does not know about.
    Custom(String),
}

impl FieldType {
    /// The wire tag for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Date => "date",
            Self::Dropdown => "dropdown",
            Self::MultipleChoice => "multiple_choice",
            Self::CheckboxGroup => "checkbox_group",
            Self::Custom(tag) => tag,
        }
    }

    /// Types answered by picking exactly one option.
    pub fn is_single_choice(&self) -> bool {
        matches!(self, Self::Dropdown | Self::MultipleChoice)
    }

    /// Types answered by picking a list of options.
    pub fn is_multi_choice(&self) -> bool {
        matches!(self, Self::CheckboxGroup)
    }

    /// Free-text types.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::ShortText | Self::LongText)
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "short_text" => Self::ShortText,
            "long_text" => Self::LongText,
            "email" => Self::Email,
            "number" => Self::Number,
            "date" => Self::Date,
            "dropdown" => Self::Dropdown,
            "multiple_choice" => Self::MultipleChoice,
            "checkbox_group" => Self::CheckboxGroup,
            _ => Self::Custom(tag),
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Custom(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Constraints ─────────────────────────────────────────────────────────

/// A `min`/`max` bound.
///
/// Numbers bound numeric answers and selection counts; strings bound
/// dates (compared lexicographically as ISO-8601).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Limit {
    Number(f64),
    Text(String),
}

impl Limit {
    /// Numeric view of the bound. Numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Count view of the bound, for selection limits.
    pub fn as_count(&self) -> Option<usize> {
        self.as_f64()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as usize)
    }

    /// String view of the bound, for date limits.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Type-specific validation constraints declared on a field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraints {
    /// Minimum text length, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum text length, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the text must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
    /// Lower bound (number, date or selection count).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Limit>,
    /// Upper bound (number, date or selection count).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Limit>,
}

impl FieldConstraints {
    /// No constraints declared.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One selectable option of a choice field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Stored value.
    pub value: String,
    /// Display label; falls back to the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }
}

// ── Field ───────────────────────────────────────────────────────────────

/// A form input unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Stable identifier, never changes after creation.
    pub id: FieldId,
    /// Type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Alias used by export and logic in place of `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Question title shown to respondents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whether an answer is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Declared options for choice types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Type-specific constraints.
    #[serde(default, skip_serializing_if = "FieldConstraints::is_empty")]
    pub validation: FieldConstraints,
}

impl Field {
    /// Create an optional, unconstrained field.
    pub fn new(id: impl Into<FieldId>, field_type: impl Into<FieldType>) -> Self {
        Self {
            id: id.into(),
            field_type: field_type.into(),
            key: None,
            title: None,
            required: false,
            options: Vec::new(),
            validation: FieldConstraints::default(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = values.into_iter().map(FieldOption::new).collect();
        self
    }

    pub fn with_validation(mut self, validation: FieldConstraints) -> Self {
        self.validation = validation;
        self
    }

    /// The key used for uniqueness and export: `key` when present and
    /// non-empty, otherwise the field id.
    pub fn effective_key(&self) -> &str {
        match self.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => self.id.as_str(),
        }
    }

    /// Title for messages, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }

    /// Whether `value` is one of the declared option values.
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_key_prefers_non_empty_alias() {
        let plain = Field::new("f1", FieldType::ShortText);
        assert_eq!(plain.effective_key(), "f1");

        let aliased = Field::new("f1", FieldType::ShortText).with_key("first_name");
        assert_eq!(aliased.effective_key(), "first_name");

        let blank = Field::new("f1", FieldType::ShortText).with_key("");
        assert_eq!(blank.effective_key(), "f1");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let untitled = Field::new("q7", FieldType::Email);
        assert_eq!(untitled.display_name(), "q7");
        let titled = untitled.with_title("Work email");
        assert_eq!(titled.display_name(), "Work email");
    }

    #[test]
    fn unknown_type_tag_survives_round_trip() {
        let json = r#"{"id":"sig","type":"signature"}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, FieldType::Custom("signature".into()));
        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["type"], "signature");
    }

    #[test]
    fn builder_json_shape_deserializes() {
        let json = r#"{
            "id": "topics",
            "type": "checkbox_group",
            "required": true,
            "validation": { "min": 1, "max": 2 },
            "options": [{ "value": "opt1" }, { "value": "opt2", "label": "Option 2" }]
        }"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert!(field.required);
        assert!(field.field_type.is_multi_choice());
        assert_eq!(field.validation.min.as_ref().and_then(Limit::as_count), Some(1));
        assert_eq!(field.validation.max.as_ref().and_then(Limit::as_count), Some(2));
        assert!(field.has_option("opt2"));
        assert!(!field.has_option("opt3"));
    }

    #[test]
    fn date_limits_stay_textual() {
        let json = r#"{"min":"2024-01-01","max":"2024-12-31"}"#;
        let constraints: FieldConstraints = serde_json::from_str(json).unwrap();
        assert_eq!(
            constraints.min.as_ref().and_then(Limit::as_text),
            Some("2024-01-01")
        );
        assert!(constraints.max.as_ref().and_then(Limit::as_count).is_none());
    }

    #[test]
    fn choice_classification() {
        assert!(FieldType::Dropdown.is_single_choice());
        assert!(FieldType::MultipleChoice.is_single_choice());
        assert!(!FieldType::CheckboxGroup.is_single_choice());
        assert!(FieldType::LongText.is_text());
    }
}
