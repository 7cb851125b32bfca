//! Built-in value rules.
//!
//! Each rule sees only non-empty answers; the required/empty check runs
//! before dispatch.

use chrono::{DateTime, NaiveDate};
use dashmap::DashMap;
use form_types::{Field, Limit};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::outcome::FieldValidation;
use crate::registry::ValueRule;

/// Distinct `pattern` strings kept compiled; the cache is emptied when it
/// reaches this size.
const PATTERN_CACHE_LIMIT: usize = 512;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex");
    /// Compiled text patterns; `None` marks a pattern that does not compile.
    static ref PATTERNS: DashMap<String, Option<Regex>> = DashMap::new();
}

const INVALID_SELECTION: &str = "Invalid selection";

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

// ── Email ───────────────────────────────────────────────────────────────

/// Trimmed value must look like `local@domain.tld`.
pub struct EmailRule;

impl ValueRule for EmailRule {
    fn name(&self) -> &str {
        "email"
    }

    fn validate(&self, _field: &Field, value: &Value) -> FieldValidation {
        match value.as_str() {
            Some(s) if EMAIL.is_match(s.trim()) => FieldValidation::pass(),
            _ => FieldValidation::fail("Please enter a valid email address"),
        }
    }
}

// ── Date ────────────────────────────────────────────────────────────────

/// ISO-8601 date, bounded by `min` / `max`.
///
/// Bounds are compared as strings; ISO-8601 orders lexicographically.
pub struct DateRule;

fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(s).is_ok()
}

impl ValueRule for DateRule {
    fn name(&self) -> &str {
        "date"
    }

    fn validate(&self, field: &Field, value: &Value) -> FieldValidation {
        let Some(date) = value.as_str().map(str::trim).filter(|s| is_iso_date(s)) else {
            return FieldValidation::fail("Please enter a valid date");
        };

        if let Some(min) = field.validation.min.as_ref().and_then(Limit::as_text) {
            if date < min {
                return FieldValidation::fail(format!("Date must be on or after {}", min));
            }
        }
        if let Some(max) = field.validation.max.as_ref().and_then(Limit::as_text) {
            if date > max {
                return FieldValidation::fail(format!("Date must be on or before {}", max));
            }
        }
        FieldValidation::pass()
    }
}

// ── Number ──────────────────────────────────────────────────────────────

/// Numeric answer (JSON number or numeric string) within `min` / `max`.
pub struct NumberRule;

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

impl ValueRule for NumberRule {
    fn name(&self) -> &str {
        "number"
    }

    fn validate(&self, field: &Field, value: &Value) -> FieldValidation {
        let Some(number) = as_number(value) else {
            return FieldValidation::fail("Please enter a valid number");
        };

        if let Some(min) = field.validation.min.as_ref() {
            if min.as_f64().is_some_and(|m| number < m) {
                return FieldValidation::fail(format!("Must be at least {}", min));
            }
        }
        if let Some(max) = field.validation.max.as_ref() {
            if max.as_f64().is_some_and(|m| number > m) {
                return FieldValidation::fail(format!("Must be at most {}", max));
            }
        }
        FieldValidation::pass()
    }
}

// ── Choice ──────────────────────────────────────────────────────────────

/// Answer must equal one declared option value.
pub struct SingleChoiceRule;

impl ValueRule for SingleChoiceRule {
    fn name(&self) -> &str {
        "single-choice"
    }

    fn validate(&self, field: &Field, value: &Value) -> FieldValidation {
        match value.as_str() {
            Some(choice) if field.has_option(choice) => FieldValidation::pass(),
            _ => FieldValidation::fail(INVALID_SELECTION),
        }
    }
}

/// Answer must be a list of declared option values whose length lies
/// within the `min` / `max` selection count.
pub struct MultiChoiceRule;

impl ValueRule for MultiChoiceRule {
    fn name(&self) -> &str {
        "multi-choice"
    }

    fn validate(&self, field: &Field, value: &Value) -> FieldValidation {
        let Some(selected) = value.as_array() else {
            return FieldValidation::fail(INVALID_SELECTION);
        };

        if let Some(min) = field.validation.min.as_ref().and_then(Limit::as_count) {
            if selected.len() < min {
                return FieldValidation::fail(format!(
                    "Please select at least {}",
                    plural(min, "option")
                ));
            }
        }
        if let Some(max) = field.validation.max.as_ref().and_then(Limit::as_count) {
            if selected.len() > max {
                return FieldValidation::fail(format!(
                    "Too many selections: maximum {} allowed",
                    plural(max, "option")
                ));
            }
        }

        let all_declared = selected
            .iter()
            .all(|item| item.as_str().is_some_and(|v| field.has_option(v)));
        if all_declared {
            FieldValidation::pass()
        } else {
            FieldValidation::fail(INVALID_SELECTION)
        }
    }
}

// ── Text ────────────────────────────────────────────────────────────────

/// `pattern` compiled once per distinct string. An invalid pattern is
/// logged on first sight and yields `None`.
fn compiled_pattern(field: &Field, pattern: &str) -> Option<Regex> {
    if let Some(cached) = PATTERNS.get(pattern) {
        return cached.value().clone();
    }

    let compiled = match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(field = %field.id, pattern, error = %e, "Skipping invalid pattern");
            None
        }
    };
    if PATTERNS.len() >= PATTERN_CACHE_LIMIT {
        PATTERNS.clear();
    }
    PATTERNS.insert(pattern.to_string(), compiled.clone());
    compiled
}

/// Length bounds (in characters) and an optional regex `pattern`.
pub struct TextRule;

impl ValueRule for TextRule {
    fn name(&self) -> &str {
        "text"
    }

    fn validate(&self, field: &Field, value: &Value) -> FieldValidation {
        let Some(text) = value.as_str() else {
            return FieldValidation::fail("Please enter text");
        };
        let constraints = &field.validation;
        let length = text.chars().count();

        if let Some(min) = constraints.min_length {
            if length < min {
                return FieldValidation::fail(format!(
                    "Must be at least {}",
                    plural(min, "character")
                ));
            }
        }
        if let Some(max) = constraints.max_length {
            if length > max {
                return FieldValidation::fail(format!(
                    "Must be no more than {}",
                    plural(max, "character")
                ));
            }
        }
        if let Some(pattern) = constraints.pattern.as_deref() {
            if let Some(re) = compiled_pattern(field, pattern) {
                if !re.is_match(text) {
                    return FieldValidation::fail(
                        constraints
                            .pattern_message
                            .clone()
                            .unwrap_or_else(|| "Please match the requested format".into()),
                    );
                }
            }
        }
        FieldValidation::pass()
    }
}
