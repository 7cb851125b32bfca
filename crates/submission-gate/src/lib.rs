//! # submission-gate
//!
//! Decides, once per final submit, whether an answer set is accepted.
//!
//! ```text
//! SubmissionAttempt
//!        │
//!  ┌─────▼──────┐  populated                ┌──────────────────┐
//!  │  Honeypot  │──────────────────────────▶│ honeypot_filled  │
//!  └─────┬──────┘                           └──────────────────┘
//!  ┌─────▼──────┐  elapsed < min            ┌──────────────────┐
//!  │ Time trap  │──────────────────────────▶│ too_fast         │
//!  └─────┬──────┘                           └──────────────────┘
//!  ┌─────▼──────┐  count > maxRequests      ┌──────────────────┐
//!  │ Source IP  │──────────────────────────▶│ rate_limit_ip    │
//!  └─────┬──────┘                           └──────────────────┘
//!  ┌─────▼──────┐  count > maxRequests      ┌──────────────────┐
//!  │  Form id   │──────────────────────────▶│ rate_limit_form  │
//!  └─────┬──────┘                           └──────────────────┘
//!        ▼
//!    accepted
//! ```
//!
//! The first failing check decides. Rate-limit counters are the only
//! shared mutable state in the engine: they live for the lifetime of the
//! [`SubmissionGate`], are cleared by [`SubmissionGate::update_config`] or
//! [`SubmissionGate::reset`], and expired windows are evicted rather than
//! kept forever.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod gate;
pub mod rate_limiter;
pub mod stats;
pub mod types;

pub use config::{GateConfig, RateLimitConfig};
pub use error::{GateError, GateResult};
pub use gate::SubmissionGate;
pub use rate_limiter::{FixedWindowLimiter, WindowHit};
pub use stats::GateStats;
pub use types::{GateDecision, RejectionReason, SubmissionAttempt};
