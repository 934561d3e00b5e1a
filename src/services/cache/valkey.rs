use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::services::cache::client::{KvStore, StoreError, StoreResult, ttl_millis};

/// Compare-then-delete, evaluated atomically on the server.
const DELETE_IF_EQUALS_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

/// Valkey/Redis-backed store.
///
/// Every command is bounded by `op_timeout`; a timed-out command surfaces as
/// `StoreError::Timeout` and its effect on the server is unknown.
#[derive(Clone)]
pub struct ValkeyStore {
    manager: redis::aio::ConnectionManager,
    op_timeout: Duration,
    delete_if_equals: redis::Script,
}

impl std::fmt::Debug for ValkeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeyStore")
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl ValkeyStore {
    // Create a Valkey store from a URL like `redis://localhost:6379`
    pub async fn new(url: &str, op_timeout: Duration) -> StoreResult<Self> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;

        let manager = tokio::time::timeout(op_timeout, client.get_connection_manager())
            .await
            .map_err(|_| StoreError::Timeout(op_timeout))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            manager,
            op_timeout,
            delete_if_equals: redis::Script::new(DELETE_IF_EQUALS_SCRIPT),
        })
    }

    async fn bounded<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout(self.op_timeout))?
            .map_err(|e| StoreError::Command(e.to_string()))
    }
}

#[async_trait]
impl KvStore for ValkeyStore {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.manager.clone();
        self.bounded(redis::cmd("GET").arg(key).query_async(&mut conn))
            .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        self.bounded(
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_millis(ttl))
                .query_async::<()>(&mut conn),
        )
        .await
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        // `SET key value NX PX <millis>` returns `OK` if set, Nil otherwise.
        let mut conn = self.manager.clone();
        let resp: Option<String> = self
            .bounded(
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("PX")
                    .arg(ttl_millis(ttl))
                    .query_async(&mut conn),
            )
            .await?;

        Ok(resp.is_some())
    }

    async fn del(&self, keys: &[String]) -> StoreResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }

        let mut conn = self.manager.clone();
        self.bounded(cmd.query_async(&mut conn)).await
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.manager.clone();
        self.bounded(redis::cmd("KEYS").arg(pattern).query_async(&mut conn))
            .await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.manager.clone();
        let n: u64 = self
            .bounded(redis::cmd("EXISTS").arg(key).query_async(&mut conn))
            .await?;
        Ok(n > 0)
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> StoreResult<i64> {
        let mut conn = self.manager.clone();
        let (count,): (i64,) = self
            .bounded(
                redis::pipe()
                    .atomic()
                    .cmd("INCR")
                    .arg(key)
                    .cmd("PEXPIRE")
                    .arg(key)
                    .arg(ttl_millis(ttl))
                    .ignore()
                    .query_async(&mut conn),
            )
            .await?;
        Ok(count)
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> StoreResult<bool> {
        let mut conn = self.manager.clone();
        let deleted: i64 = self
            .bounded(
                self.delete_if_equals
                    .key(key)
                    .arg(expected)
                    .invoke_async(&mut conn),
            )
            .await?;
        Ok(deleted == 1)
    }
}
