//! Combined integrity report for the builder's publish check.

use form_types::{Form, Severity};
use serde::Serialize;

use crate::graph::{detect_logic_cycles, LogicError};
use crate::keys::{validate_unique_keys, DuplicateKeyError};

/// Key and logic findings for one form.
#[derive(Clone, Debug, Default, Serialize)]
pub struct IntegrityReport {
    pub duplicate_keys: Vec<DuplicateKeyError>,
    pub logic: Vec<LogicError>,
}

impl IntegrityReport {
    /// No blocking finding: the form may be published.
    pub fn is_publishable(&self) -> bool {
        let keys = self.duplicate_keys.iter().map(DuplicateKeyError::severity);
        let logic = self.logic.iter().map(LogicError::severity);
        !keys.chain(logic).any(|s| s.blocks_publish())
    }

    /// No finding of any severity.
    pub fn is_clean(&self) -> bool {
        self.duplicate_keys.is_empty() && self.logic.is_empty()
    }

    /// Messages for every finding of `severity`, in report order.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        let keys = self
            .duplicate_keys
            .iter()
            .filter(|e| e.severity() == severity)
            .map(ToString::to_string);
        let logic = self
            .logic
            .iter()
            .filter(|e| e.severity() == severity)
            .map(ToString::to_string);
        keys.chain(logic).collect()
    }

    pub fn blocking(&self) -> Vec<String> {
        self.messages(Severity::Blocking)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Severity::Warning)
    }
}

/// Run the key and logic analyses in one pass.
pub fn check_form(form: &Form) -> IntegrityReport {
    IntegrityReport {
        duplicate_keys: validate_unique_keys(form),
        logic: detect_logic_cycles(form),
    }
}
