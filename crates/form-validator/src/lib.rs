//! # form-validator
//!
//! Validates a single answer against its field's declared constraints.
//! The form runtime calls it on blur/change and again on page advance.
//!
//! ```text
//! validate_block_data(field, value)
//!   1. required && empty  ──▶ fail ("Please select an option", ...)
//!   2. empty              ──▶ pass (no further checks)
//!   3. registry[field.type].validate(field, value)
//!   4. no rule registered ──▶ pass
//! ```
//!
//! Rules are looked up by type tag in a [`ValidatorRegistry`]; a new field
//! type registers its own [`ValueRule`] instead of extending a central
//! conditional. Failures are per-answer rejections carried in
//! [`FieldValidation`], never errors.

#![deny(unsafe_code)]

pub mod answers;
pub mod error;
pub mod outcome;
pub mod registry;
pub mod rules;

pub use answers::{validate_answers, validate_page, AnswerErrors};
pub use error::{ValidatorError, ValidatorResult};
pub use outcome::{is_empty_value, FieldValidation};
pub use registry::{check_constraints, validate_block_data, ValidatorRegistry, ValueRule};
pub use rules::{DateRule, EmailRule, MultiChoiceRule, NumberRule, SingleChoiceRule, TextRule};
