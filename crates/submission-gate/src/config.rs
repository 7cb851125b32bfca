//! Gate configuration supplied by the hosting application.

use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Longest accepted rate-limit window: one week.
pub const MAX_WINDOW_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Fixed-window limit for one rate-limit dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    /// Submissions allowed per window.
    pub max_requests: u32,
    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    fn validate(&self, name: &str) -> GateResult<()> {
        if self.max_requests == 0 {
            return Err(GateError::InvalidConfig(format!(
                "{}.maxRequests must be positive",
                name
            )));
        }
        if self.window_ms == 0 {
            return Err(GateError::InvalidConfig(format!(
                "{}.windowMs must be positive",
                name
            )));
        }
        if self.window_ms > MAX_WINDOW_MS {
            return Err(GateError::InvalidConfig(format!(
                "{}.windowMs must not exceed {}",
                name, MAX_WINDOW_MS
            )));
        }
        Ok(())
    }
}

/// Submission gate configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateConfig {
    /// Name of the hidden field bots tend to fill in.
    pub honeypot_field: String,
    /// Minimum time between render and submit (ms).
    pub min_completion_time_ms: u64,
    /// Limit per source IP.
    pub ip_limit: RateLimitConfig,
    /// Limit per form id.
    pub form_limit: RateLimitConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            honeypot_field: "_gotcha".into(),
            min_completion_time_ms: 3000,
            ip_limit: RateLimitConfig::new(5, 60_000),
            form_limit: RateLimitConfig::new(100, 60_000),
        }
    }
}

impl GateConfig {
    /// Tighter limits for forms under active abuse.
    pub fn strict() -> Self {
        Self {
            min_completion_time_ms: 5000,
            ip_limit: RateLimitConfig::new(2, 60_000),
            form_limit: RateLimitConfig::new(30, 60_000),
            ..Self::default()
        }
    }

    /// Looser limits for kiosks and shared networks.
    pub fn relaxed() -> Self {
        Self {
            min_completion_time_ms: 1000,
            ip_limit: RateLimitConfig::new(30, 60_000),
            form_limit: RateLimitConfig::new(1000, 60_000),
            ..Self::default()
        }
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> GateResult<()> {
        if self.honeypot_field.trim().is_empty() {
            return Err(GateError::InvalidConfig(
                "honeypotField must not be empty".into(),
            ));
        }
        self.ip_limit.validate("ipLimit")?;
        self.form_limit.validate("formLimit")?;
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing keys take their
    /// default values.
    pub fn from_json(json: &str) -> GateResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = GateConfig::default();
        assert_eq!(c.min_completion_time_ms, 3000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn presets_order() {
        let strict = GateConfig::strict();
        let relaxed = GateConfig::relaxed();
        assert!(strict.ip_limit.max_requests < GateConfig::default().ip_limit.max_requests);
        assert!(relaxed.ip_limit.max_requests > GateConfig::default().ip_limit.max_requests);
        assert!(strict.min_completion_time_ms > relaxed.min_completion_time_ms);
        assert!(strict.validate().is_ok());
        assert!(relaxed.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = GateConfig::from_json(
            r#"{"honeypotField":"website","ipLimit":{"maxRequests":2,"windowMs":10000}}"#,
        )
        .unwrap();
        assert_eq!(c.honeypot_field, "website");
        assert_eq!(c.ip_limit, RateLimitConfig::new(2, 10_000));
        assert_eq!(c.form_limit, GateConfig::default().form_limit);
        assert_eq!(c.min_completion_time_ms, 3000);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = GateConfig::from_json(r#"{"formLimit":{"maxRequests":0,"windowMs":1000}}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid gate config: formLimit.maxRequests must be positive"
        );

        let mut c = GateConfig::default();
        c.ip_limit.window_ms = 0;
        assert!(c.validate().is_err());
        c.ip_limit.window_ms = MAX_WINDOW_MS + 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn blank_honeypot_is_rejected() {
        let c = GateConfig {
            honeypot_field: "  ".into(),
            ..GateConfig::default()
        };
        assert!(matches!(c.validate(), Err(GateError::InvalidConfig(_))));
    }

    #[test]
    fn config_serde() {
        let c = GateConfig::strict();
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("minCompletionTimeMs"));
        let restored = GateConfig::from_json(&json).unwrap();
        assert_eq!(restored, c);
    }
}
