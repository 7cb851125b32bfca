//! Effective-key uniqueness.
//!
//! A field's effective key is its alias `key` when set and non-empty,
//! otherwise its id. Export columns and logic lookups use it, so two
//! fields sharing one would silently overwrite each other's answers.

use std::collections::{HashMap, HashSet};

use form_types::{Field, FieldId, Form, Severity};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// A field involved in a finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldRef {
    pub id: FieldId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl FieldRef {
    fn from_field(field: &Field) -> Self {
        Self {
            id: field.id.clone(),
            title: field.title.clone(),
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "\"{}\" ({})", title, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Two or more fields share an effective key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
#[error("duplicate key \"{key}\" used by {}", join_fields(.fields))]
pub struct DuplicateKeyError {
    /// The shared key.
    pub key: String,
    /// Every colliding field, in form order.
    pub fields: Vec<FieldRef>,
}

impl DuplicateKeyError {
    pub fn severity(&self) -> Severity {
        Severity::Blocking
    }
}

fn join_fields(fields: &[FieldRef]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Report every effective key used by more than one field, across all
/// pages. Comparison is case-sensitive. An empty result means the form's
/// keys are valid.
pub fn validate_unique_keys(form: &Form) -> Vec<DuplicateKeyError> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Field>> = HashMap::new();

    for field in form.fields() {
        let key = field.effective_key();
        let group = groups.entry(key).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(field);
    }

    let errors: Vec<DuplicateKeyError> = order
        .into_iter()
        .filter_map(|key| {
            let group = groups.get(key)?;
            (group.len() > 1).then(|| DuplicateKeyError {
                key: key.to_string(),
                fields: group.iter().map(|f| FieldRef::from_field(f)).collect(),
            })
        })
        .collect();

    debug!(
        form = %form.id,
        fields = form.field_count(),
        duplicates = errors.len(),
        "Checked effective keys"
    );
    for error in &errors {
        warn!(form = %form.id, key = %error.key, count = error.fields.len(), "Duplicate field key");
    }

    errors
}

/// Derive a key from `base` that is not in `existing_keys`.
///
/// The trimmed base is returned unchanged when free; otherwise `-2`, `-3`,
/// ... is appended until a free key is found. Only `existing_keys` is
/// consulted, so the result is deterministic for a given input. At most
/// `existing_keys.len() + 1` suffixes are tried, since that many
/// candidates cannot all be taken.
pub fn generate_unique_key(base: &str, existing_keys: &HashSet<String>) -> String {
    let base = base.trim();
    if !existing_keys.contains(base) {
        return base.to_string();
    }

    let mut suffix = 2usize;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !existing_keys.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
