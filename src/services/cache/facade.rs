//! Typed cache access over a `KvStore`.
//!
//! Values are stored as JSON. A missing key is reported as `CacheError::Miss`,
//! which read paths treat as "go to the database", not as a failure.
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::services::cache::client::{KvStore, StoreError};
use crate::services::cache::keys::{CacheKey, KeyPattern};
use crate::services::cache::ttl::CacheTtls;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,
    #[error("failed to serialize cache value: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("failed to deserialize cache value for '{key}': {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CacheError {
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KvStore>,
    ttls: CacheTtls,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.store.backend_name())
            .field("ttls", &self.ttls)
            .finish()
    }
}

impl Cache {
    pub fn new(store: Arc<dyn KvStore>, ttls: CacheTtls) -> Self {
        Self { store, ttls }
    }

    pub fn ttls(&self) -> &CacheTtls {
        &self.ttls
    }

    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let json = serde_json::to_string(value).map_err(CacheError::Serialization)?;
        self.store.set(key, &json, ttl).await?;
        tracing::debug!(key, ttl_ms = ttl.as_millis() as u64, "cache set");
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        let raw = self.store.get(key).await?.ok_or(CacheError::Miss)?;
        serde_json::from_str(&raw).map_err(|source| CacheError::Deserialization {
            key: key.to_string(),
            source,
        })
    }

    pub async fn delete(&self, key: &str) -> CacheResult<bool> {
        let n = self.store.del(&[key.to_string()]).await?;
        Ok(n > 0)
    }

    /// Delete every key matching `pattern`.
    ///
    /// Enumeration and deletion are two round-trips: a key created in between
    /// survives until the next invalidation or its TTL.
    pub async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let keys = self.store.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let deleted = self.store.del(&keys).await?;
        tracing::debug!(pattern, deleted, "cache pattern deleted");
        Ok(deleted)
    }

    pub async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.store.exists(key).await?)
    }

    pub async fn increment(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        Ok(self.store.incr_with_ttl(key, ttl).await?)
    }

    pub async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        Ok(self.store.set_if_absent(key, value, ttl).await?)
    }

    pub(crate) async fn delete_if_equals(&self, key: &str, expected: &str) -> CacheResult<bool> {
        Ok(self.store.delete_if_equals(key, expected).await?)
    }

    // Key-template helpers.

    pub async fn get_key<T: DeserializeOwned>(&self, key: &CacheKey) -> CacheResult<T> {
        self.get(&key.to_string()).await
    }

    /// Set with the configured TTL of the key's template.
    pub async fn set_key<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> CacheResult<()> {
        self.set(&key.to_string(), value, self.ttls.for_key(key))
            .await
    }

    pub async fn delete_matching(&self, pattern: &KeyPattern) -> CacheResult<u64> {
        match pattern {
            KeyPattern::Exact(key) => Ok(u64::from(self.delete(&key.to_string()).await?)),
            glob => self.delete_pattern(&glob.to_string()).await,
        }
    }

    /// Cache-aside read.
    ///
    /// Returns the cached value when present. On a miss, or when the cache
    /// cannot answer, the value comes from `load` and is written back with the
    /// key's TTL. Cache failures never reach the caller; only `load` errors do.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &CacheKey, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let rendered = key.to_string();
        match self.get::<T>(&rendered).await {
            Ok(hit) => {
                tracing::debug!(key = %rendered, "cache hit");
                return Ok(hit);
            }
            Err(CacheError::Miss) => tracing::debug!(key = %rendered, "cache miss"),
            Err(e @ CacheError::Deserialization { .. }) => {
                tracing::error!(key = %rendered, error = %e, "cached value unreadable; reloading")
            }
            Err(e) => tracing::warn!(key = %rendered, error = %e, "cache read failed; reloading"),
        }

        let value = load().await?;

        if let Err(e) = self.set_key(key, &value).await {
            tracing::warn!(key = %rendered, error = %e, "cache populate failed");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::client::MockKvStore;
    use crate::services::cache::memory::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn memory_cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()), CacheTtls::default())
    }

    #[tokio::test]
    async fn miss_then_populate() {
        let cache = memory_cache();

        let err = cache.get::<Sample>("sample:1").await.unwrap_err();
        assert!(err.is_miss());

        let value = Sample {
            name: "Lisbon".into(),
            count: 3,
        };
        cache
            .set("sample:1", &value, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get::<Sample>("sample:1").await.unwrap(), value);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache = memory_cache();
        cache
            .set("short", &1u32, Duration::from_millis(50))
            .await
            .unwrap();

        assert_eq!(cache.get::<u32>("short").await.unwrap(), 1);
        assert!(cache.exists("short").await.unwrap());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get::<u32>("short").await.unwrap_err().is_miss());
        assert!(!cache.exists("short").await.unwrap());
    }

    #[tokio::test]
    async fn schema_mismatch_is_deserialization_error() {
        let cache = memory_cache();
        cache
            .set("sample:2", &"not an object", Duration::from_secs(60))
            .await
            .unwrap();

        let err = cache.get::<Sample>("sample:2").await.unwrap_err();
        assert!(matches!(err, CacheError::Deserialization { ref key, .. } if key == "sample:2"));
    }

    #[tokio::test]
    async fn delete_pattern_only_touches_matches() {
        let cache = memory_cache();
        let ttl = Duration::from_secs(60);
        cache.set("public_trips:1:20", &1, ttl).await.unwrap();
        cache.set("public_trips:2:20", &2, ttl).await.unwrap();
        cache.set("public_trip:abc", &3, ttl).await.unwrap();

        assert_eq!(cache.delete_pattern("public_trips:*").await.unwrap(), 2);
        assert!(cache.exists("public_trip:abc").await.unwrap());

        // nothing left to match
        assert_eq!(cache.delete_pattern("public_trips:*").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increment_counts_within_window() {
        let cache = memory_cache();
        let ttl = Duration::from_secs(60);
        assert_eq!(cache.increment("rate_limit:a", ttl).await.unwrap(), 1);
        assert_eq!(cache.increment("rate_limit:a", ttl).await.unwrap(), 2);
        assert_eq!(cache.increment("rate_limit:b", ttl).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn set_if_absent_does_not_overwrite() {
        let cache = memory_cache();
        let ttl = Duration::from_secs(60);
        assert!(cache.set_if_absent("lock:x", "a", ttl).await.unwrap());
        assert!(!cache.set_if_absent("lock:x", "b", ttl).await.unwrap());
        assert!(!cache.delete_if_equals("lock:x", "b").await.unwrap());
        assert!(cache.delete_if_equals("lock:x", "a").await.unwrap());
    }

    #[tokio::test]
    async fn store_failure_is_not_a_miss() {
        let mut store = MockKvStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Command("READONLY".into())));

        let cache = Cache::new(Arc::new(store), CacheTtls::default());
        let err = cache.get::<Sample>("sample:3").await.unwrap_err();

        assert!(!err.is_miss());
        assert!(matches!(err, CacheError::Store(StoreError::Command(_))));
    }

    #[tokio::test]
    async fn get_or_load_populates_then_hits() {
        let cache = memory_cache();
        let key = CacheKey::AdminStats;

        let first: u32 = cache
            .get_or_load(&key, || async { Ok::<_, ()>(7) })
            .await
            .unwrap();
        assert_eq!(first, 7);

        // served from cache; the loader would produce something else
        let second: u32 = cache
            .get_or_load(&key, || async { Ok::<_, ()>(8) })
            .await
            .unwrap();
        assert_eq!(second, 7);
    }

    #[tokio::test]
    async fn get_or_load_survives_a_dead_store() {
        let mut store = MockKvStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Connection("refused".into())));
        store
            .expect_set()
            .returning(|_, _, _| Err(StoreError::Connection("refused".into())));

        let cache = Cache::new(Arc::new(store), CacheTtls::default());
        let value: u32 = cache
            .get_or_load(&CacheKey::AdminStats, || async { Ok::<_, ()>(3) })
            .await
            .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn get_or_load_reloads_unreadable_entries() {
        let cache = memory_cache();
        cache
            .set("admin_stats", &"garbage", Duration::from_secs(60))
            .await
            .unwrap();

        let value: u32 = cache
            .get_or_load(&CacheKey::AdminStats, || async { Ok::<_, ()>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
        assert_eq!(cache.get::<u32>("admin_stats").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn get_or_load_does_not_cache_loader_errors() {
        let cache = memory_cache();
        let res: Result<u32, &str> = cache
            .get_or_load(&CacheKey::AdminStats, || async { Err("db down") })
            .await;
        assert_eq!(res, Err("db down"));
        assert!(!cache.exists("admin_stats").await.unwrap());
    }

    #[tokio::test]
    async fn set_key_uses_template_ttl() {
        let mut store = MockKvStore::new();
        store
            .expect_set()
            .withf(|key, _, ttl| key == "admin_stats" && *ttl == Duration::from_secs(600))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let cache = Cache::new(Arc::new(store), CacheTtls::default());
        cache.set_key(&CacheKey::AdminStats, &42u32).await.unwrap();
    }
}
