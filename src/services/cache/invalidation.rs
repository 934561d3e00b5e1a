//! Which cache entries go stale when an entity changes.
//!
//! Cached views are denormalized (trip lists embed trips, stop lists embed
//! activity counts, admin stats embed totals), so a single write can stale
//! several templates. The rules here err on the side of deleting too much:
//! an unnecessary miss costs one database read, a missed delete serves stale
//! data until the TTL runs out.
use thiserror::Error;
use uuid::Uuid;

use crate::services::cache::facade::{Cache, CacheError};
use crate::services::cache::keys::{CacheKey, KeyPattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    // Created/deleted entities move the totals in `admin_stats`.
    fn changes_totals(self) -> bool {
        matches!(self, Self::Created | Self::Deleted)
    }
}

/// The identity of a trip as cached views see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRef {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub share_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TripChange {
    pub trip: TripRef,
    // Share token before the write, when it differs from `trip.share_token`.
    pub previous_share_token: Option<String>,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone)]
pub struct StopChange {
    pub stop_id: Uuid,
    pub trip: TripRef,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone)]
pub struct ActivityChange {
    pub stop_id: Uuid,
    pub trip_id: Uuid,
    pub kind: ChangeKind,
}

/// Ordered, de-duplicated set of patterns to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationPlan {
    patterns: Vec<KeyPattern>,
}

impl InvalidationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pattern: impl Into<KeyPattern>) -> &mut Self {
        let pattern = pattern.into();
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
        self
    }

    pub fn merge(mut self, other: InvalidationPlan) -> Self {
        for p in other.patterns {
            self.push(p);
        }
        self
    }

    pub fn patterns(&self) -> &[KeyPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn trip_views(plan: &mut InvalidationPlan, trip: &TripRef) {
    plan.push(CacheKey::public_trip_by_id(trip.id));
    if let Some(token) = &trip.share_token {
        plan.push(CacheKey::public_trip_by_token(token));
    }
    // Visibility may have flipped either way; public lists are cheap to rebuild.
    plan.push(KeyPattern::AllPublicTrips);
    plan.push(KeyPattern::AllUserTrips(trip.owner_id));
    plan.push(CacheKey::TripStops(trip.id));
}

/// A trip was created, edited or deleted.
pub fn trip_changed(change: &TripChange) -> InvalidationPlan {
    let mut plan = InvalidationPlan::new();
    trip_views(&mut plan, &change.trip);
    if let Some(token) = &change.previous_share_token {
        plan.push(CacheKey::public_trip_by_token(token));
    }
    // Edits move `public_trips` and `average_budget` too, not only creates/deletes.
    plan.push(CacheKey::AdminStats);
    plan
}

/// A stop was added to, edited in or removed from a trip.
pub fn stop_changed(change: &StopChange) -> InvalidationPlan {
    let mut plan = InvalidationPlan::new();
    plan.push(CacheKey::StopActivities(change.stop_id));
    // Trip views carry the stop count.
    trip_views(&mut plan, &change.trip);
    if change.kind.changes_totals() {
        plan.push(CacheKey::AdminStats);
    }
    plan
}

/// An activity was added to, edited in or removed from a stop.
pub fn activity_changed(change: &ActivityChange) -> InvalidationPlan {
    let mut plan = InvalidationPlan::new();
    plan.push(CacheKey::StopActivities(change.stop_id));
    // Stop lists carry the activity count.
    plan.push(CacheKey::TripStops(change.trip_id));
    if change.kind.changes_totals() {
        plan.push(CacheKey::AdminStats);
    }
    plan
}

#[derive(Debug, Error)]
#[error("invalidation of '{pattern}' failed: {source}")]
pub struct InvalidationError {
    pub pattern: String,
    #[source]
    pub source: CacheError,
}

#[derive(Clone, Debug)]
pub struct Invalidator {
    cache: Cache,
}

impl Invalidator {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Delete everything in `plan`.
    ///
    /// Keeps going after a failing pattern so the rest still get deleted, then
    /// reports the first failure. Already-absent keys are not an error.
    pub async fn apply(&self, plan: &InvalidationPlan) -> Result<u64, InvalidationError> {
        let mut deleted = 0;
        let mut first_err = None;

        for pattern in plan.patterns() {
            match self.cache.delete_matching(pattern).await {
                Ok(n) => deleted += n,
                Err(source) => {
                    tracing::warn!(pattern = %pattern, error = %source, "cache invalidation failed");
                    if first_err.is_none() {
                        first_err = Some(InvalidationError {
                            pattern: pattern.to_string(),
                            source,
                        });
                    }
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }

    /// Write-path variant: the store write is already committed, so a failure
    /// here is only logged. TTL expiry bounds the staleness.
    pub async fn apply_best_effort(&self, plan: &InvalidationPlan) {
        match self.apply(plan).await {
            Ok(deleted) => {
                tracing::debug!(patterns = plan.patterns().len(), deleted, "cache invalidated")
            }
            Err(e) => tracing::warn!(error = %e, "stale cache entries left to expire"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::client::{MockKvStore, StoreError};
    use crate::services::cache::memory::MemoryStore;
    use crate::services::cache::ttl::CacheTtls;
    use std::sync::Arc;
    use std::time::Duration;

    fn trip_ref() -> TripRef {
        TripRef {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            share_token: Some("tok-new".into()),
        }
    }

    fn rendered(plan: &InvalidationPlan) -> Vec<String> {
        plan.patterns().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn trip_update_covers_every_trip_template() {
        let trip = trip_ref();
        let plan = trip_changed(&TripChange {
            trip: trip.clone(),
            previous_share_token: Some("tok-old".into()),
            kind: ChangeKind::Updated,
        });

        let keys = rendered(&plan);
        assert_eq!(
            keys,
            vec![
                format!("public_trip:{}", trip.id),
                "public_trip:tok-new".to_string(),
                "public_trips:*".to_string(),
                format!("user_trips:{}:*", trip.owner_id),
                format!("trip_stops:{}", trip.id),
                "public_trip:tok-old".to_string(),
                "admin_stats".to_string(),
            ]
        );
    }

    #[test]
    fn admin_stats_follow_trip_edits_and_child_counts() {
        let trip = trip_ref();
        let created = trip_changed(&TripChange {
            trip: trip.clone(),
            previous_share_token: None,
            kind: ChangeKind::Created,
        });
        assert!(rendered(&created).contains(&"admin_stats".to_string()));

        let stop_deleted = stop_changed(&StopChange {
            stop_id: Uuid::new_v4(),
            trip,
            kind: ChangeKind::Deleted,
        });
        assert!(rendered(&stop_deleted).contains(&"admin_stats".to_string()));

        // a moved or renamed stop leaves the totals alone
        let stop_edited = stop_changed(&StopChange {
            stop_id: Uuid::new_v4(),
            trip: trip_ref(),
            kind: ChangeKind::Updated,
        });
        assert!(!rendered(&stop_edited).contains(&"admin_stats".to_string()));
    }

    #[test]
    fn stop_change_covers_activities_and_parent_trip() {
        let trip = trip_ref();
        let stop_id = Uuid::new_v4();
        let keys = rendered(&stop_changed(&StopChange {
            stop_id,
            trip: trip.clone(),
            kind: ChangeKind::Updated,
        }));

        assert!(keys.contains(&format!("stop_activities:{stop_id}")));
        assert!(keys.contains(&format!("trip_stops:{}", trip.id)));
        assert!(keys.contains(&format!("user_trips:{}:*", trip.owner_id)));
        assert!(keys.contains(&"public_trips:*".to_string()));
    }

    #[test]
    fn activity_change_covers_stop_list_counts() {
        let (stop_id, trip_id) = (Uuid::new_v4(), Uuid::new_v4());
        let keys = rendered(&activity_changed(&ActivityChange {
            stop_id,
            trip_id,
            kind: ChangeKind::Updated,
        }));
        assert_eq!(
            keys,
            vec![
                format!("stop_activities:{stop_id}"),
                format!("trip_stops:{trip_id}"),
            ]
        );
    }

    #[test]
    fn plan_deduplicates() {
        let mut plan = InvalidationPlan::new();
        plan.push(CacheKey::AdminStats).push(CacheKey::AdminStats);
        let plan = plan.merge({
            let mut other = InvalidationPlan::new();
            other.push(CacheKey::AdminStats);
            other
        });
        assert_eq!(plan.patterns().len(), 1);
    }

    #[tokio::test]
    async fn trip_update_leaves_no_stale_entries_and_is_idempotent() {
        let cache = Cache::new(Arc::new(MemoryStore::new()), CacheTtls::default());
        let trip = trip_ref();
        let stranger = Uuid::new_v4();
        let ttl = Duration::from_secs(60);

        let stale = [
            format!("public_trip:{}", trip.id),
            "public_trip:tok-new".to_string(),
            "public_trips:1:20".to_string(),
            "public_trips:2:20".to_string(),
            format!("user_trips:{}:1:20", trip.owner_id),
            format!("user_trips:{}:3:10", trip.owner_id),
            format!("trip_stops:{}", trip.id),
        ];
        for key in &stale {
            cache.set(key, &"view", ttl).await.unwrap();
        }
        let unrelated = format!("user_trips:{stranger}:1:20");
        cache.set(&unrelated, &"view", ttl).await.unwrap();

        let invalidator = Invalidator::new(cache.clone());
        let plan = trip_changed(&TripChange {
            trip,
            previous_share_token: None,
            kind: ChangeKind::Updated,
        });

        assert_eq!(invalidator.apply(&plan).await.unwrap(), stale.len() as u64);
        for key in &stale {
            assert!(!cache.exists(key).await.unwrap(), "{key} survived");
        }
        assert!(cache.exists(&unrelated).await.unwrap());

        // second run: nothing left, still fine
        assert_eq!(invalidator.apply(&plan).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn keeps_deleting_after_a_failure() {
        let mut store = MockKvStore::new();
        store
            .expect_keys()
            .returning(|_| Err(StoreError::Timeout(Duration::from_millis(500))));
        // the three exact keys after the failing glob are still deleted
        store.expect_del().times(3).returning(|keys| Ok(keys.len() as u64));

        let invalidator = Invalidator::new(Cache::new(Arc::new(store), CacheTtls::default()));
        let mut plan = InvalidationPlan::new();
        plan.push(KeyPattern::AllPublicTrips);
        let plan = plan.merge(activity_changed(&ActivityChange {
            stop_id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            kind: ChangeKind::Created,
        }));

        let err = invalidator.apply(&plan).await.unwrap_err();
        assert_eq!(err.pattern, "public_trips:*");
    }
}
