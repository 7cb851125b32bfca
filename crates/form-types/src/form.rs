//! Pages and forms.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::field::Field;
use crate::ids::{FormId, PageId};
use crate::logic::LogicRule;

/// An ordered sequence of fields shown together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Page {
    pub fn new(id: impl Into<PageId>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            title: None,
            fields,
        }
    }
}

/// A complete form: pages plus the logic rule set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub logic: Vec<LogicRule>,
}

impl Form {
    pub fn new(id: impl Into<FormId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            pages: Vec::new(),
            logic: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    pub fn with_rule(mut self, rule: LogicRule) -> Self {
        self.logic.push(rule);
        self
    }

    /// Every field across every page, in page order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.pages.iter().flat_map(|p| p.fields.iter())
    }

    pub fn field_count(&self) -> usize {
        self.pages.iter().map(|p| p.fields.len()).sum()
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields().find(|f| f.id.as_str() == id)
    }

    pub fn contains_field(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    /// Ids of all fields, for existence checks.
    pub fn field_ids(&self) -> HashSet<&str> {
        self.fields().map(|f| f.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn sample() -> Form {
        Form::new("contact", "Contact us")
            .with_page(Page::new(
                "p1",
                vec![
                    Field::new("name", FieldType::ShortText),
                    Field::new("email", FieldType::Email),
                ],
            ))
            .with_page(Page::new("p2", vec![Field::new("msg", FieldType::LongText)]))
    }

    #[test]
    fn fields_span_all_pages_in_order() {
        let form = sample();
        let ids: Vec<&str> = form.fields().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["name", "email", "msg"]);
        assert_eq!(form.field_count(), 3);
    }

    #[test]
    fn field_lookup_crosses_pages() {
        let form = sample();
        assert!(form.contains_field("msg"));
        assert!(!form.contains_field("phone"));
        assert_eq!(form.field("email").map(|f| &f.field_type), Some(&FieldType::Email));
    }

    #[test]
    fn missing_logic_defaults_to_empty() {
        let form: Form = serde_json::from_str(r#"{"id":"f","pages":[]}"#).unwrap();
        assert!(form.logic.is_empty());
        assert!(form.title.is_empty());
    }
}
