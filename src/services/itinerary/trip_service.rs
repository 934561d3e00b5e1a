use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{NewTrip, Page, Pagination, PublicTripView, TripPatch, TripView};
use crate::repos::ItineraryStore;
use crate::services::cache::invalidation::{TripChange, trip_changed};
use crate::services::cache::{Cache, CacheKey, ChangeKind, InvalidationPlan, Invalidator, LockManager};
use crate::services::itinerary::access::{owned_trip, visible_trip};
use crate::services::itinerary::error::{ServiceError, ServiceResult};

pub fn new_share_token() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

#[derive(Clone)]
pub struct TripService {
    store: Arc<dyn ItineraryStore>,
    cache: Cache,
    locks: LockManager,
    invalidator: Invalidator,
}

impl TripService {
    pub fn new(
        store: Arc<dyn ItineraryStore>,
        cache: Cache,
        locks: LockManager,
        invalidator: Invalidator,
    ) -> Self {
        Self {
            store,
            cache,
            locks,
            invalidator,
        }
    }

    pub async fn create_trip(&self, mut new: NewTrip) -> ServiceResult<TripView> {
        if new.end_date < new.start_date {
            return Err(ServiceError::validation("end date must be after start date"));
        }
        new.share_token = new.is_public.then(new_share_token);

        let trip = self.store.insert_trip(&new).await?;
        tracing::info!(trip_id = %trip.id, user_id = %trip.user_id, "trip created");

        self.invalidator
            .apply_best_effort(&trip_changed(&TripChange {
                trip: trip.trip_ref(),
                previous_share_token: None,
                kind: ChangeKind::Created,
            }))
            .await;

        Ok(trip.into())
    }

    pub async fn get_trip(&self, trip_id: Uuid, viewer: Option<Uuid>) -> ServiceResult<TripView> {
        let trip = visible_trip(self.store.as_ref(), trip_id, viewer).await?;
        Ok(trip.into())
    }

    /// Anonymous read by share token. Every read counts as a view; a cached
    /// view is served as-is while the counter is bumped in the background.
    pub async fn get_public_trip(&self, share_token: &str) -> ServiceResult<PublicTripView> {
        let key = CacheKey::public_trip_by_token(share_token);

        match self.cache.get_key::<PublicTripView>(&key).await {
            Ok(view) => {
                let store = Arc::clone(&self.store);
                let trip_id = view.id;
                tokio::spawn(async move {
                    if let Err(e) = store.increment_view_count(trip_id).await {
                        tracing::warn!(%trip_id, error = %e, "view count not recorded");
                    }
                });
                return Ok(view);
            }
            Err(e) if e.is_miss() => tracing::debug!(key = %key, "cache miss"),
            Err(e) => tracing::warn!(key = %key, error = %e, "cache read failed; reloading"),
        }

        let trip = self
            .store
            .public_trip_by_share_token(share_token)
            .await?
            .ok_or(ServiceError::NotFound("trip"))?;

        if let Err(e) = self.store.increment_view_count(trip.id).await {
            tracing::warn!(trip_id = %trip.id, error = %e, "view count not recorded");
        }

        let view = PublicTripView::from(trip);
        if let Err(e) = self.cache.set_key(&key, &view).await {
            tracing::warn!(key = %key, error = %e, "cache populate failed");
        }
        Ok(view)
    }

    /// Owner-only partial update, serialized per trip by `trip_update_{id}`.
    ///
    /// A concurrent update fails fast with `ServiceError::Busy`.
    pub async fn update_trip(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        mut patch: TripPatch,
    ) -> ServiceResult<TripView> {
        if patch.is_empty() {
            return Err(ServiceError::validation("no fields to update"));
        }
        owned_trip(self.store.as_ref(), trip_id, user_id).await?;

        self.locks
            .with_lock(&format!("trip_update_{trip_id}"), move || async move {
                // Re-read under the lock; the pre-check may be stale.
                let before = owned_trip(self.store.as_ref(), trip_id, user_id).await?;

                let start = patch.start_date.unwrap_or(before.start_date);
                let end = patch.end_date.unwrap_or(before.end_date);
                if end < start {
                    return Err(ServiceError::validation("end date must be after start date"));
                }

                // Keep existing share links stable; only mint one when going public.
                match patch.is_public {
                    Some(true) if before.share_token.is_none() => {
                        patch.share_token = Some(Some(new_share_token()))
                    }
                    Some(false) => patch.share_token = Some(None),
                    _ => {}
                }

                let after = self
                    .store
                    .update_trip(trip_id, &patch)
                    .await
                    .map_err(ServiceError::or_missing("trip"))?;

                let previous_share_token = before
                    .share_token
                    .filter(|old| after.share_token.as_ref() != Some(old));
                self.invalidator
                    .apply_best_effort(&trip_changed(&TripChange {
                        trip: after.trip_ref(),
                        previous_share_token,
                        kind: ChangeKind::Updated,
                    }))
                    .await;

                tracing::info!(%trip_id, "trip updated");
                self.get_trip(trip_id, Some(user_id)).await
            })
            .await
    }

    /// Owner-only delete. Stops and activities go with the trip.
    pub async fn delete_trip(&self, trip_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        owned_trip(self.store.as_ref(), trip_id, user_id).await?;

        self.locks
            .with_lock(&format!("trip_update_{trip_id}"), move || async move {
                let trip = owned_trip(self.store.as_ref(), trip_id, user_id).await?;
                let stops = self.store.trip_stops(trip_id).await?;

                self.store
                    .delete_trip(trip_id)
                    .await
                    .map_err(ServiceError::or_missing("trip"))?;

                let mut plan = InvalidationPlan::new();
                for stop in &stops {
                    plan.push(CacheKey::StopActivities(stop.id));
                }
                let plan = trip_changed(&TripChange {
                    trip: trip.trip_ref(),
                    previous_share_token: None,
                    kind: ChangeKind::Deleted,
                })
                .merge(plan);
                self.invalidator.apply_best_effort(&plan).await;

                tracing::info!(%trip_id, stops = stops.len(), "trip deleted");
                Ok::<_, ServiceError>(())
            })
            .await
    }

    pub async fn list_user_trips(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> ServiceResult<Page<TripView>> {
        let key = CacheKey::UserTrips {
            user_id,
            page: page.page,
            limit: page.limit,
        };
        self.cache
            .get_or_load(&key, move || async move {
                let (trips, total) = self.store.user_trips(user_id, page).await?;
                let views = trips.into_iter().map(TripView::from).collect();
                Ok::<_, ServiceError>(Page::new(page, total, views))
            })
            .await
    }

    pub async fn list_public_trips(&self, page: Pagination) -> ServiceResult<Page<PublicTripView>> {
        let key = CacheKey::PublicTrips {
            page: page.page,
            limit: page.limit,
        };
        self.cache
            .get_or_load(&key, move || async move {
                let (trips, total) = self.store.public_trips(page).await?;
                let views = trips.into_iter().map(PublicTripView::from).collect();
                Ok::<_, ServiceError>(Page::new(page, total, views))
            })
            .await
    }
}
