//! # form-types
//!
//! The form data model shared by the integrity analyzers, the answer
//! validator and the submission gate.
//!
//! ```text
//! Form
//!  ├── pages: [Page]
//!  │     └── fields: [Field]   (id, type, key?, required, options, validation)
//!  └── logic: [LogicRule]
//!        ├── trigger_field?
//!        ├── conditions: [Condition]  (field_id, operator, value)
//!        └── actions:    [LogicAction] (show | hide | jump | skip | set_value → target)
//! ```
//!
//! Shapes are produced and persisted by the builder's data layer; this
//! crate only describes them. Every type (de)serializes in the builder's
//! camelCase JSON form.

#![deny(unsafe_code)]

pub mod field;
pub mod form;
pub mod ids;
pub mod logic;
pub mod severity;

pub use field::{Field, FieldConstraints, FieldOption, FieldType, Limit};
pub use form::{Form, Page};
pub use ids::{FieldId, FormId, PageId, RuleId};
pub use logic::{ActionKind, Condition, ConditionOperator, LogicAction, LogicRule};
pub use severity::Severity;
