//! Distributed lock on top of the cache store.
//!
//! - acquire: `SET lock:{name} <owner token> NX PX <ttl ms>`
//! - release: delete only if the stored value is still our owner token (server-side script)
//!
//! There is no renewal: a holder that outlives its TTL silently loses the lock,
//! and its later release is a no-op because the token no longer matches.
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::services::cache::facade::{Cache, CacheError};
use crate::services::cache::keys::CacheKey;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock '{name}' is held by another owner")]
    Held { name: String },
    // Outcome unknown (e.g. timeout). Callers must treat this as not acquired.
    #[error("could not verify lock state for '{name}': {source}")]
    Store {
        name: String,
        #[source]
        source: CacheError,
    },
}

#[derive(Clone, Debug)]
pub struct LockManager {
    cache: Cache,
    default_ttl: Duration,
}

impl LockManager {
    pub fn new(cache: Cache) -> Self {
        let default_ttl = cache.ttls().lock;
        Self { cache, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Try once to take the named lock. No waiting, no retry.
    pub async fn acquire(&self, name: &str, ttl: Duration) -> Result<LockGuard, LockError> {
        let key = CacheKey::Lock(name.to_string()).to_string();
        let token = Uuid::new_v4().to_string();

        let acquired = self
            .cache
            .set_if_absent(&key, &token, ttl)
            .await
            .map_err(|source| LockError::Store {
                name: name.to_string(),
                source,
            })?;

        if !acquired {
            tracing::debug!(lock = %key, "lock already held");
            return Err(LockError::Held {
                name: name.to_string(),
            });
        }

        tracing::debug!(lock = %key, ttl_ms = ttl.as_millis() as u64, "lock acquired");
        Ok(LockGuard {
            cache: self.cache.clone(),
            key,
            token,
            held: true,
        })
    }

    /// Run `f` while holding `name` (default lock TTL), releasing afterwards on
    /// every exit path.
    pub async fn with_lock<T, E, F, Fut>(&self, name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let guard = self.acquire(name, self.default_ttl).await?;
        let result = f().await;
        guard.release().await;
        result
    }
}

/// Ownership of one acquired lock.
///
/// Dropping a guard that was not released (early return, panic, cancelled
/// request) schedules the release on the current runtime.
#[derive(Debug)]
#[must_use = "a lock guard releases its lock when dropped"]
pub struct LockGuard {
    cache: Cache,
    key: String,
    token: String,
    held: bool,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Release the lock if we still own it.
    ///
    /// Returns `true` when our key was deleted, `false` when it had already
    /// expired or now belongs to someone else. Store failures are logged and
    /// swallowed; the TTL reclaims the lock.
    pub async fn release(mut self) -> bool {
        self.held = false;
        release_owned(&self.cache, &self.key, &self.token).await
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(lock = %self.key, "lock dropped outside a runtime; left to expire");
            return;
        };

        let cache = self.cache.clone();
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);
        handle.spawn(async move {
            release_owned(&cache, &key, &token).await;
        });
    }
}

async fn release_owned(cache: &Cache, key: &str, token: &str) -> bool {
    match cache.delete_if_equals(key, token).await {
        Ok(true) => {
            tracing::debug!(lock = %key, "lock released");
            true
        }
        Ok(false) => {
            tracing::debug!(lock = %key, "lock no longer owned; nothing released");
            false
        }
        Err(e) => {
            tracing::warn!(lock = %key, error = %e, "lock release failed; relying on ttl");
            false
        }
    }
}
