//! The submission gate: ordered anti-abuse checks over one attempt.
//!
//! Checks run in a fixed order and the first failure decides:
//! - honeypot: the hidden field carries any value
//! - time trap: submitted sooner than `minCompletionTimeMs` after render
//! - source limit: fixed window per source IP
//! - form limit: fixed window per form id
//!
//! Only attempts that reach a limiter consume quota in it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::rate_limiter::FixedWindowLimiter;
use crate::stats::GateStats;
use crate::types::{GateDecision, RejectionReason, SubmissionAttempt};

/// Attempts between opportunistic sweeps of closed windows.
const SWEEP_EVERY: u64 = 1024;

// ── Checks ──────────────────────────────────────────────────────────────

/// Whether a honeypot value counts as filled in. Anything but null, an
/// empty string, an empty list or an empty object does.
fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

fn honeypot_filled(config: &GateConfig, attempt: &SubmissionAttempt) -> bool {
    attempt
        .answers
        .get(&config.honeypot_field)
        .is_some_and(is_populated)
}

fn too_fast(config: &GateConfig, attempt: &SubmissionAttempt) -> bool {
    let elapsed = attempt.elapsed_ms();
    elapsed < 0 || (elapsed as u64) < config.min_completion_time_ms
}

// ── State ───────────────────────────────────────────────────────────────

struct GateState {
    config: GateConfig,
    by_source: FixedWindowLimiter,
    by_form: FixedWindowLimiter,
}

impl GateState {
    fn new(config: GateConfig) -> Self {
        Self {
            by_source: FixedWindowLimiter::new(config.ip_limit),
            by_form: FixedWindowLimiter::new(config.form_limit),
            config,
        }
    }
}

#[derive(Default)]
struct Counters {
    total: AtomicU64,
    accepted: AtomicU64,
    rejected: [AtomicU64; 4],
}

impl Counters {
    fn record(&self, decision: &GateDecision) {
        self.total.fetch_add(1, Ordering::Relaxed);
        match decision.reason {
            None => self.accepted.fetch_add(1, Ordering::Relaxed),
            Some(reason) => self.rejected[reason.index()].fetch_add(1, Ordering::Relaxed),
        };
    }

    fn clear(&self) {
        self.total.store(0, Ordering::Relaxed);
        self.accepted.store(0, Ordering::Relaxed);
        for slot in &self.rejected {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

// ── Gate ────────────────────────────────────────────────────────────────

/// Process-wide submission gate.
///
/// Evaluations share a read lock on the configuration; per-key counting
/// is serialized by the limiters. Replacing the configuration takes the
/// write lock and starts every counter from zero.
pub struct SubmissionGate {
    state: RwLock<GateState>,
    counters: Counters,
}

impl SubmissionGate {
    /// Build a gate after validating `config`.
    pub fn new(config: GateConfig) -> GateResult<Self> {
        config.validate()?;
        info!(
            honeypot = %config.honeypot_field,
            min_completion_ms = config.min_completion_time_ms,
            ip_max = config.ip_limit.max_requests,
            form_max = config.form_limit.max_requests,
            "Submission gate ready"
        );
        Ok(Self {
            state: RwLock::new(GateState::new(config)),
            counters: Counters::default(),
        })
    }

    /// Current configuration.
    pub fn config(&self) -> GateResult<GateConfig> {
        let state = self.state.read().map_err(|_| GateError::LockPoisoned)?;
        Ok(state.config.clone())
    }

    /// Decide whether `attempt` is accepted. `attempt.submitted_at` is the
    /// clock for the rate-limit windows.
    pub fn evaluate(&self, attempt: &SubmissionAttempt) -> GateResult<GateDecision> {
        let decision = {
            let state = self.state.read().map_err(|_| GateError::LockPoisoned)?;
            let decision = Self::decide(&state, attempt);
            // Recorded under the read guard; reset and update_config hold
            // the write guard while clearing.
            self.counters.record(&decision);
            decision
        };

        match decision.reason {
            None => debug!(
                form = %attempt.form_id,
                source = %attempt.source,
                "Submission accepted"
            ),
            Some(reason) => warn!(
                form = %attempt.form_id,
                source = %attempt.source,
                reason = %reason,
                elapsed_ms = attempt.elapsed_ms(),
                "Submission rejected"
            ),
        }

        if self.counters.total.load(Ordering::Relaxed) % SWEEP_EVERY == 0 {
            self.sweep_expired(attempt.submitted_at)?;
        }
        Ok(decision)
    }

    fn decide(state: &GateState, attempt: &SubmissionAttempt) -> GateDecision {
        let config = &state.config;
        if honeypot_filled(config, attempt) {
            return GateDecision::rejected(RejectionReason::HoneypotFilled);
        }
        if too_fast(config, attempt) {
            return GateDecision::rejected(RejectionReason::TooFast);
        }

        let now = attempt.submitted_at;
        if !state.by_source.hit(&attempt.source, now).allowed {
            return GateDecision::rejected(RejectionReason::RateLimitIp);
        }
        if !state.by_form.hit(attempt.form_id.as_str(), now).allowed {
            return GateDecision::rejected(RejectionReason::RateLimitForm);
        }
        GateDecision::accepted()
    }

    /// Replace the configuration. Rate-limit windows and counters restart.
    pub fn update_config(&self, config: GateConfig) -> GateResult<()> {
        config.validate()?;
        let mut state = self.state.write().map_err(|_| GateError::LockPoisoned)?;
        *state = GateState::new(config);
        self.counters.clear();
        info!(
            ip_max = state.config.ip_limit.max_requests,
            form_max = state.config.form_limit.max_requests,
            "Submission gate reconfigured"
        );
        Ok(())
    }

    /// Forget all rate-limit windows and counters, keeping the configuration.
    pub fn reset(&self) -> GateResult<()> {
        let state = self.state.write().map_err(|_| GateError::LockPoisoned)?;
        state.by_source.clear();
        state.by_form.clear();
        self.counters.clear();
        info!("Submission gate reset");
        Ok(())
    }

    /// Evict windows closed by `now`. Returns how many were evicted.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> GateResult<usize> {
        let state = self.state.read().map_err(|_| GateError::LockPoisoned)?;
        Ok(state.by_source.sweep_expired(now) + state.by_form.sweep_expired(now))
    }

    /// Counters plus live windows as of `now`. Closed windows are evicted.
    pub fn stats(&self, now: DateTime<Utc>) -> GateResult<GateStats> {
        self.sweep_expired(now)?;
        let state = self.state.read().map_err(|_| GateError::LockPoisoned)?;

        let rejected = RejectionReason::ALL
            .iter()
            .filter_map(|reason| {
                let n = self.counters.rejected[reason.index()].load(Ordering::Relaxed);
                (n > 0).then_some((*reason, n))
            })
            .collect();

        Ok(GateStats {
            total_attempts: self.counters.total.load(Ordering::Relaxed),
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected,
            by_source: state.by_source.snapshot(now),
            by_form: state.by_form.snapshot(now),
        })
    }
}

impl std::fmt::Debug for SubmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionGate")
            .field("attempts", &self.counters.total.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use chrono::Duration;
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn attempt_at(submitted_at: DateTime<Utc>) -> SubmissionAttempt {
        SubmissionAttempt::new(
            "contact",
            "1.2.3.4",
            submitted_at - Duration::seconds(30),
            submitted_at,
        )
    }

    fn reason(gate: &SubmissionGate, attempt: &SubmissionAttempt) -> Option<RejectionReason> {
        gate.evaluate(attempt).unwrap().reason
    }

    #[test]
    fn honeypot_values() {
        assert!(!is_populated(&Value::Null));
        assert!(!is_populated(&json!("")));
        assert!(!is_populated(&json!([])));
        assert!(is_populated(&json!(" ")));
        assert!(is_populated(&json!(0)));
        assert!(is_populated(&json!(false)));
    }

    #[test]
    fn empty_honeypot_is_ignored() {
        let gate = SubmissionGate::new(GateConfig::default()).unwrap();
        let attempt = attempt_at(t0()).with_answer("_gotcha", json!(""));
        assert!(gate.evaluate(&attempt).unwrap().is_valid());
    }

    #[test]
    fn honeypot_beats_everything() {
        let gate = SubmissionGate::new(GateConfig::default()).unwrap();
        let mut attempt = attempt_at(t0()).with_answer("_gotcha", json!("http://spam"));
        attempt.rendered_at = attempt.submitted_at;
        assert_eq!(reason(&gate, &attempt), Some(RejectionReason::HoneypotFilled));
    }

    #[test]
    fn time_trap_boundaries() {
        let gate = SubmissionGate::new(GateConfig::default()).unwrap();
        let mut quick = attempt_at(t0());
        quick.rendered_at = t0() - Duration::milliseconds(2_999);
        assert_eq!(reason(&gate, &quick), Some(RejectionReason::TooFast));

        let mut exact = attempt_at(t0());
        exact.rendered_at = t0() - Duration::milliseconds(3_000);
        assert_eq!(reason(&gate, &exact), None);

        let mut inverted = attempt_at(t0());
        inverted.rendered_at = t0() + Duration::seconds(60);
        assert_eq!(reason(&gate, &inverted), Some(RejectionReason::TooFast));
    }

    #[test]
    fn early_rejections_spend_no_quota() {
        let config = GateConfig {
            ip_limit: RateLimitConfig::new(1, 60_000),
            ..GateConfig::default()
        };
        let gate = SubmissionGate::new(config).unwrap();
        let bot = attempt_at(t0()).with_answer("_gotcha", json!("x"));
        assert!(!gate.evaluate(&bot).unwrap().is_valid());
        assert!(gate.evaluate(&attempt_at(t0())).unwrap().is_valid());
    }

    #[test]
    fn form_limit_applies_across_sources() {
        let config = GateConfig {
            form_limit: RateLimitConfig::new(2, 60_000),
            ..GateConfig::default()
        };
        let gate = SubmissionGate::new(config).unwrap();
        for (i, expected) in [None, None, Some(RejectionReason::RateLimitForm)]
            .into_iter()
            .enumerate()
        {
            let mut attempt = attempt_at(t0());
            attempt.source = format!("10.0.0.{}", i);
            assert_eq!(reason(&gate, &attempt), expected);
        }
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = GateConfig {
            honeypot_field: String::new(),
            ..GateConfig::default()
        };
        assert!(matches!(
            SubmissionGate::new(config),
            Err(GateError::InvalidConfig(_))
        ));

        let gate = SubmissionGate::new(GateConfig::default()).unwrap();
        let mut bad = GateConfig::default();
        bad.ip_limit.max_requests = 0;
        assert!(gate.update_config(bad).is_err());
        assert_eq!(gate.config().unwrap(), GateConfig::default());
    }

    #[test]
    fn update_config_restarts_counters() {
        let config = GateConfig {
            ip_limit: RateLimitConfig::new(1, 60_000),
            ..GateConfig::default()
        };
        let gate = SubmissionGate::new(config.clone()).unwrap();
        assert!(gate.evaluate(&attempt_at(t0())).unwrap().is_valid());
        assert!(!gate.evaluate(&attempt_at(t0())).unwrap().is_valid());

        gate.update_config(config).unwrap();
        assert_eq!(gate.stats(t0()).unwrap().total_attempts, 0);
        assert!(gate.evaluate(&attempt_at(t0())).unwrap().is_valid());
    }

    #[test]
    fn reset_keeps_config() {
        let gate = SubmissionGate::new(GateConfig::strict()).unwrap();
        gate.evaluate(&attempt_at(t0())).unwrap();
        gate.reset().unwrap();
        let stats = gate.stats(t0()).unwrap();
        assert_eq!(stats, GateStats::default());
        assert_eq!(gate.config().unwrap(), GateConfig::strict());
    }

    #[test]
    fn stats_tally_decisions_and_live_windows() {
        let config = GateConfig {
            ip_limit: RateLimitConfig::new(1, 10_000),
            form_limit: RateLimitConfig::new(10, 10_000),
            ..GateConfig::default()
        };
        let gate = SubmissionGate::new(config).unwrap();
        gate.evaluate(&attempt_at(t0())).unwrap();
        gate.evaluate(&attempt_at(t0())).unwrap();
        let mut quick = attempt_at(t0());
        quick.rendered_at = t0();
        gate.evaluate(&quick).unwrap();

        let stats = gate.stats(t0()).unwrap();
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected_for(RejectionReason::RateLimitIp), 1);
        assert_eq!(stats.rejected_for(RejectionReason::TooFast), 1);
        assert_eq!(stats.by_source.get("1.2.3.4"), Some(&2));
        assert_eq!(stats.by_form.get("contact"), Some(&1));

        let later = gate.stats(t0() + Duration::seconds(11)).unwrap();
        assert!(later.by_source.is_empty());
        assert!(later.by_form.is_empty());
        assert_eq!(later.total_attempts, 3);
    }
}
