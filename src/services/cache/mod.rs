pub mod client;
pub mod facade;
pub mod invalidation;
pub mod keys;
pub mod lock;
#[cfg(test)]
pub mod memory;
pub mod ttl;
pub mod valkey;

pub use client::KvStore;
pub use facade::Cache;
pub use invalidation::{ChangeKind, InvalidationPlan, Invalidator, TripRef};
pub use keys::CacheKey;
pub use lock::{LockError, LockManager};
pub use ttl::CacheTtls;
pub use valkey::ValkeyStore;
