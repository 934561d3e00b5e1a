//! In-process `KvStore` with per-key expiry, used by tests.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::services::cache::client::{KvStore, StoreResult};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_live<R>(&self, f: impl FnOnce(&mut HashMap<String, Entry>) -> R) -> R {
        let mut map = self.inner.lock().unwrap();
        let now = Instant::now();
        map.retain(|_, e| e.expires_at > now);
        f(&mut map)
    }
}

/// Redis-style glob: `*` matches any run, `?` matches one char.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();
    let (mut pi, mut ki) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == k[ki]) {
            pi += 1;
            ki += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ki));
            pi += 1;
        } else if let Some((sp, sk)) = star {
            pi = sp + 1;
            ki = sk + 1;
            star = Some((sp, sk + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

#[async_trait]
impl KvStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.with_live(|m| m.get(key).map(|e| e.value.clone())))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.with_live(|m| {
            m.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: Instant::now() + ttl,
                },
            );
        });
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        Ok(self.with_live(|m| {
            if m.contains_key(key) {
                return false;
            }
            m.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: Instant::now() + ttl,
                },
            );
            true
        }))
    }

    async fn del(&self, keys: &[String]) -> StoreResult<u64> {
        Ok(self.with_live(|m| keys.iter().filter(|k| m.remove(*k).is_some()).count() as u64))
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        Ok(self.with_live(|m| {
            m.keys()
                .filter(|k| glob_match(pattern, k))
                .cloned()
                .collect()
        }))
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.with_live(|m| m.contains_key(key)))
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> StoreResult<i64> {
        Ok(self.with_live(|m| {
            let current = m
                .get(key)
                .and_then(|e| e.value.parse::<i64>().ok())
                .unwrap_or(0);
            let next = current + 1;
            m.insert(
                key.to_string(),
                Entry {
                    value: next.to_string(),
                    expires_at: Instant::now() + ttl,
                },
            );
            next
        }))
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> StoreResult<bool> {
        Ok(self.with_live(|m| match m.get(key) {
            Some(e) if e.value == expected => {
                m.remove(key);
                true
            }
            _ => false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_like_redis_keys() {
        assert!(glob_match("public_trips:*", "public_trips:1:20"));
        assert!(glob_match("user_trips:u1:*", "user_trips:u1:2:50"));
        assert!(!glob_match("user_trips:u1:*", "user_trips:u10:1:20"));
        assert!(glob_match("admin_stats", "admin_stats"));
        assert!(glob_match("lock:?", "lock:a"));
        assert!(!glob_match("trip_stops:a", "trip_stops:ab"));
    }
}
