//! Sliding-window admission control keyed by caller identity.
//!
//! Each key carries the timestamps of its recent admissions. A call first
//! discards timestamps older than the window, then admits if the count is
//! under the limit; otherwise it reports how long until the oldest
//! retained admission leaves the window.
//!
//! Idle keys are never evicted -- an accepted resource-growth trade-off,
//! same as the session store.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Identity a rate bucket is keyed by: the authenticated caller when
/// known, else the network origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateKey {
    User(i64),
    Addr(IpAddr),
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Seconds until a rejected caller may retry; 0 when admitted.
    pub retry_after_secs: u64,
}

/// Sliding-window rate limiter with per-key admission history.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    buckets: DashMap<RateKey, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            buckets: DashMap::new(),
        }
    }

    /// Check and record one admission attempt for `key`.
    pub fn check(&self, key: RateKey) -> RateDecision {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(key).or_default();

        bucket.retain(|stamp| now.duration_since(*stamp) < self.window);

        if (bucket.len() as u32) < self.limit {
            bucket.push(now);
            return RateDecision {
                allowed: true,
                retry_after_secs: 0,
            };
        }

        // Oldest retained admission defines when a slot frees up.
        let retry_after = bucket
            .first()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(self.window);
        RateDecision {
            allowed: false,
            retry_after_secs: retry_after.as_secs().max(1),
        }
    }
}
