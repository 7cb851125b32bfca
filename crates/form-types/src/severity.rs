//! Severity classes shared by every analyzer.

use serde::{Deserialize, Serialize};

/// How serious a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Must be fixed before the form can be published (duplicate keys, logic cycles).
    Blocking,
    /// The form still works but is probably broken (dangling field reference).
    Warning,
    /// A single answer was rejected; shown inline, other fields are unaffected.
    Rejection,
}

impl Severity {
    /// Whether this severity prevents publishing.
    pub fn blocks_publish(&self) -> bool {
        matches!(self, Self::Blocking)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocking => write!(f, "blocking"),
            Self::Warning => write!(f, "warning"),
            Self::Rejection => write!(f, "rejection"),
        }
    }
}
