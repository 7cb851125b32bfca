//! Submission attempts and gate decisions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use form_types::FormId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Attempt ─────────────────────────────────────────────────────────────

/// One final-submit attempt, as seen by the hosting application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAttempt {
    pub form_id: FormId,
    /// Client address; key of the per-source rate limit.
    pub source: String,
    /// Raw submitted values, including any hidden honeypot input.
    #[serde(default)]
    pub answers: HashMap<String, Value>,
    /// When the form was first rendered for this respondent.
    pub rendered_at: DateTime<Utc>,
    /// When the respondent pressed submit. Also the gate's "now".
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionAttempt {
    pub fn new(
        form_id: impl Into<FormId>,
        source: impl Into<String>,
        rendered_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            form_id: form_id.into(),
            source: source.into(),
            answers: HashMap::new(),
            rendered_at,
            submitted_at,
        }
    }

    pub fn with_answer(mut self, name: impl Into<String>, value: Value) -> Self {
        self.answers.insert(name.into(), value);
        self
    }

    /// Milliseconds between render and submit; negative if the clock
    /// values are inverted.
    pub fn elapsed_ms(&self) -> i64 {
        (self.submitted_at - self.rendered_at).num_milliseconds()
    }
}

// ── Rejection ───────────────────────────────────────────────────────────

/// Why a submission was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    HoneypotFilled,
    TooFast,
    RateLimitIp,
    RateLimitForm,
}

impl RejectionReason {
    pub const ALL: [RejectionReason; 4] = [
        Self::HoneypotFilled,
        Self::TooFast,
        Self::RateLimitIp,
        Self::RateLimitForm,
    ];

    /// Wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::HoneypotFilled => "honeypot_filled",
            Self::TooFast => "too_fast",
            Self::RateLimitIp => "rate_limit_ip",
            Self::RateLimitForm => "rate_limit_form",
        }
    }

    /// Text safe to show the respondent. A tripped honeypot gets the
    /// generic failure so bots learn nothing.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::HoneypotFilled => "Something went wrong. Please try again.",
            Self::TooFast => {
                "That was quick! Please take a moment to review your answers and submit again."
            }
            Self::RateLimitIp | Self::RateLimitForm => {
                "Too many submissions. Please wait a moment and try again."
            }
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::HoneypotFilled => 0,
            Self::TooFast => 1,
            Self::RateLimitIp => 2,
            Self::RateLimitForm => 3,
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ── Decision ────────────────────────────────────────────────────────────

/// Outcome of one gate evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
}

impl GateDecision {
    pub fn accepted() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn reason(&self) -> Option<RejectionReason> {
        self.reason
    }
}
