//! Point-in-time gate counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::RejectionReason;

/// Snapshot of gate activity since construction or the last reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStats {
    pub total_attempts: u64,
    pub accepted: u64,
    /// Rejections by reason; reasons never seen are absent.
    pub rejected: BTreeMap<RejectionReason, u64>,
    /// Live window count per source.
    pub by_source: BTreeMap<String, u32>,
    /// Live window count per form.
    pub by_form: BTreeMap<String, u32>,
}

impl GateStats {
    pub fn total_rejected(&self) -> u64 {
        self.rejected.values().sum()
    }

    pub fn rejected_for(&self, reason: RejectionReason) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    /// Share of attempts accepted, or `None` before any attempt.
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.total_attempts == 0 {
            None
        } else {
            Some(self.accepted as f64 / self.total_attempts as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_rate() {
        let mut stats = GateStats {
            total_attempts: 4,
            accepted: 1,
            ..Default::default()
        };
        stats.rejected.insert(RejectionReason::TooFast, 2);
        stats.rejected.insert(RejectionReason::RateLimitIp, 1);
        assert_eq!(stats.total_rejected(), 3);
        assert_eq!(stats.rejected_for(RejectionReason::HoneypotFilled), 0);
        assert_eq!(stats.acceptance_rate(), Some(0.25));
        assert_eq!(GateStats::default().acceptance_rate(), None);
    }

    #[test]
    fn serializes_reason_keys_as_codes() {
        let mut stats = GateStats::default();
        stats.rejected.insert(RejectionReason::HoneypotFilled, 1);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["rejected"]["honeypot_filled"], 1);
        assert_eq!(json["totalAttempts"], 0);
    }
}
