//! Key-value store interface the cache facade and the distributed lock are built on.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for raw store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Transport/command level failures of the backing store.
///
/// Note:
/// - Absence of a key is never a `StoreError`; `get` returns `Ok(None)`.
/// - `Timeout` means the outcome is unknown (the command may or may not have run).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),
    #[error("store command error: {0}")]
    Command(String),
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("store value error: {0}")]
    InvalidValue(String),
}

/// The subset of the Redis/Valkey protocol the cache layer depends on.
///
/// Every method is a single round-trip and every method that must be atomic
/// is atomic on the server side:
/// - `set_if_absent` is `SET NX PX`
/// - `incr_with_ttl` is `INCR` + `PEXPIRE` in one `MULTI/EXEC`
/// - `delete_if_equals` is a compare-then-delete script
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    // Create or overwrite `key` with expiry `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    // Returns:
    // - `Ok(true)`  if the key was set
    // - `Ok(false)` if the key already exists
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool>;

    // Delete keys. Returns number of deleted keys.
    async fn del(&self, keys: &[String]) -> StoreResult<u64>;

    // Enumerate keys matching a glob pattern (`*`, `?`).
    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;

    async fn exists(&self, key: &str) -> StoreResult<bool>;

    // Increment a counter and (re)set its expiry in one atomic unit.
    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> StoreResult<i64>;

    // Delete `key` only when its current value equals `expected`.
    // Returns `Ok(true)` when the key was deleted.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> StoreResult<bool>;
}

/// Expiry for `PX` / `PEXPIRE`. Zero would be rejected by the server, so the
/// floor is one millisecond.
pub fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}
