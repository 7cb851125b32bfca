//! # form-integrity
//!
//! Read-only analyses the builder runs on every edit, save and delete:
//!
//! - [`validate_unique_keys`] / [`generate_unique_key`]: effective keys are
//!   unique across the whole form.
//! - [`detect_logic_cycles`]: `jump` / `skip` actions never form a loop a
//!   respondent could be trapped in; rules pointing at missing fields are
//!   reported as warnings.
//! - [`get_field_references`] / [`remove_field`]: a field used by logic is
//!   never deleted silently.
//!
//! ```text
//!  Form ──┬──▶ keys        ──▶ Vec<DuplicateKeyError>   (blocking)
//!         ├──▶ graph       ──▶ Vec<LogicError>          (cycle: blocking,
//!         │                                              dangling: warning)
//!         └──▶ references  ──▶ FieldReferences ──▶ strip / remove_field
//! ```
//!
//! Findings are returned as data so that every problem is reported in a
//! single pass. Only operations that can refuse to proceed return
//! [`IntegrityError`].

#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod keys;
pub mod references;
pub mod report;

pub use error::{IntegrityError, IntegrityResult};
pub use graph::{detect_logic_cycles, CyclePath, LogicError, NavigationGraph};
pub use keys::{generate_unique_key, validate_unique_keys, DuplicateKeyError, FieldRef};
pub use references::{
    get_field_references, remove_field, strip_field_references, DeletionMode, FieldReferences,
    ReferenceType,
};
pub use report::{check_form, IntegrityReport};
