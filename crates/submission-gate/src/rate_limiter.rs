//! Fixed-window counters keyed by source or form.
//!
//! Each key owns one window that starts at its first hit. A hit landing
//! `window_ms` or more after the start opens a fresh window. The count is
//! incremented and compared while the map entry is held, so concurrent
//! hits on one key never admit more than `max_requests` per window.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::config::{RateLimitConfig, MAX_WINDOW_MS};

// ── Window ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

impl Window {
    fn is_expired(&self, now: DateTime<Utc>, length: Duration) -> bool {
        now - self.started_at >= length
    }
}

/// Result of counting one hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowHit {
    /// Whether the hit fits within the limit.
    pub allowed: bool,
    /// Hits counted in the current window, this one included.
    pub count: u32,
    /// When the current window closes, saturating at the latest
    /// representable instant.
    pub resets_at: DateTime<Utc>,
}

// ── Limiter ─────────────────────────────────────────────────────────────

/// Fixed-window rate limiter over a concurrent map.
pub struct FixedWindowLimiter {
    limit: RateLimitConfig,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub fn new(limit: RateLimitConfig) -> Self {
        Self {
            limit,
            windows: DashMap::new(),
        }
    }

    fn window_length(&self) -> Duration {
        Duration::milliseconds(self.limit.window_ms.min(MAX_WINDOW_MS) as i64)
    }

    /// Count a hit for `key` at `now`.
    pub fn hit(&self, key: &str, now: DateTime<Utc>) -> WindowHit {
        let length = self.window_length();
        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if window.is_expired(now, length) {
            window.started_at = now;
            window.count = 0;
        }
        window.count = window.count.saturating_add(1);

        WindowHit {
            allowed: window.count <= self.limit.max_requests,
            count: window.count,
            resets_at: window
                .started_at
                .checked_add_signed(length)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Hits counted for `key` in its live window.
    pub fn count(&self, key: &str, now: DateTime<Utc>) -> u32 {
        let length = self.window_length();
        self.windows
            .get(key)
            .filter(|w| !w.is_expired(now, length))
            .map(|w| w.count)
            .unwrap_or(0)
    }

    /// Drop every window that has closed by `now`. Returns how many were
    /// dropped.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let length = self.window_length();
        let before = self.windows.len();
        self.windows.retain(|_, w| !w.is_expired(now, length));
        let evicted = before.saturating_sub(self.windows.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.windows.len(), "Swept expired windows");
        }
        evicted
    }

    /// Live counts by key.
    pub fn snapshot(&self, now: DateTime<Utc>) -> BTreeMap<String, u32> {
        let length = self.window_length();
        self.windows
            .iter()
            .filter(|entry| !entry.value().is_expired(now, length))
            .map(|entry| (entry.key().clone(), entry.value().count))
            .collect()
    }

    /// Tracked keys, live or not yet swept.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn clear(&self) {
        self.windows.clear();
    }
}

impl std::fmt::Debug for FixedWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedWindowLimiter")
            .field("limit", &self.limit)
            .field("keys", &self.windows.len())
            .finish()
    }
}
