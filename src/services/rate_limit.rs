//! Fixed-window request counter on `rate_limit:{identifier}`.
use chrono::Utc;
use std::time::Duration;

use crate::services::cache::{Cache, CacheKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix seconds at which the current window ends.
    pub reset: i64,
}

#[derive(Clone, Debug)]
pub struct RateLimiter {
    cache: Cache,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(cache: Cache, limit: u32) -> Self {
        let window = cache.ttls().rate_limit_window;
        Self {
            cache,
            limit,
            window,
        }
    }

    /// Count one request for `identifier`.
    ///
    /// Fails open: when the counter cannot be read the request is allowed.
    pub async fn check(&self, identifier: &str) -> RateDecision {
        let key = CacheKey::RateLimit(identifier.to_string()).to_string();
        let reset = Utc::now().timestamp() + self.window.as_secs() as i64;

        let count = match self.cache.increment(&key, self.window).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "rate limit unavailable; allowing request");
                return RateDecision {
                    allowed: true,
                    limit: self.limit,
                    remaining: self.limit,
                    reset,
                };
            }
        };

        let limit = i64::from(self.limit);
        RateDecision {
            allowed: count <= limit,
            limit: self.limit,
            remaining: (limit - count).clamp(0, limit) as u32,
            reset,
        }
    }
}
