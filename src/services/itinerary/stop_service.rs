use std::sync::Arc;
use uuid::Uuid;

use crate::models::{NewStop, StopPatch, StopView};
use crate::repos::ItineraryStore;
use crate::services::cache::invalidation::{StopChange, stop_changed};
use crate::services::cache::{Cache, CacheKey, ChangeKind, Invalidator};
use crate::services::itinerary::access::{owned_stop, owned_trip, visible_stop, visible_trip};
use crate::services::itinerary::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct StopService {
    store: Arc<dyn ItineraryStore>,
    cache: Cache,
    invalidator: Invalidator,
}

impl StopService {
    pub fn new(store: Arc<dyn ItineraryStore>, cache: Cache, invalidator: Invalidator) -> Self {
        Self {
            store,
            cache,
            invalidator,
        }
    }

    pub async fn create_stop(&self, user_id: Uuid, new: NewStop) -> ServiceResult<StopView> {
        let trip = owned_trip(self.store.as_ref(), new.trip_id, user_id).await?;
        if new.departure_date < new.arrival_date {
            return Err(ServiceError::validation(
                "departure date must be after arrival date",
            ));
        }

        let stop = self.store.insert_stop(&new).await?;
        self.invalidator
            .apply_best_effort(&stop_changed(&StopChange {
                stop_id: stop.id,
                trip: trip.trip_ref(),
                kind: ChangeKind::Created,
            }))
            .await;

        tracing::info!(stop_id = %stop.id, trip_id = %trip.id, "stop created");
        Ok(stop.into())
    }

    pub async fn get_stop(&self, stop_id: Uuid, viewer: Option<Uuid>) -> ServiceResult<StopView> {
        let (stop, _) = visible_stop(self.store.as_ref(), stop_id, viewer).await?;
        Ok(stop.into())
    }

    pub async fn update_stop(
        &self,
        stop_id: Uuid,
        user_id: Uuid,
        patch: StopPatch,
    ) -> ServiceResult<StopView> {
        if patch.is_empty() {
            return Err(ServiceError::validation("no fields to update"));
        }
        let (before, trip) = owned_stop(self.store.as_ref(), stop_id, user_id).await?;

        let arrival = patch.arrival_date.unwrap_or(before.arrival_date);
        let departure = patch.departure_date.unwrap_or(before.departure_date);
        if departure < arrival {
            return Err(ServiceError::validation(
                "departure date must be after arrival date",
            ));
        }

        let stop = self
            .store
            .update_stop(stop_id, &patch)
            .await
            .map_err(ServiceError::or_missing("stop"))?;
        self.invalidator
            .apply_best_effort(&stop_changed(&StopChange {
                stop_id,
                trip: trip.trip_ref(),
                kind: ChangeKind::Updated,
            }))
            .await;

        Ok(stop.into())
    }

    pub async fn delete_stop(&self, stop_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let (_, trip) = owned_stop(self.store.as_ref(), stop_id, user_id).await?;

        self.store
            .delete_stop(stop_id)
            .await
            .map_err(ServiceError::or_missing("stop"))?;
        self.invalidator
            .apply_best_effort(&stop_changed(&StopChange {
                stop_id,
                trip: trip.trip_ref(),
                kind: ChangeKind::Deleted,
            }))
            .await;

        tracing::info!(%stop_id, trip_id = %trip.id, "stop deleted");
        Ok(())
    }

    /// Stops of a trip with their activity counts. Visibility is checked
    /// against the store before the cached list is consulted.
    pub async fn list_trip_stops(
        &self,
        trip_id: Uuid,
        viewer: Option<Uuid>,
    ) -> ServiceResult<Vec<StopView>> {
        visible_trip(self.store.as_ref(), trip_id, viewer).await?;

        let store = self.store.as_ref();
        self.cache
            .get_or_load(&CacheKey::TripStops(trip_id), move || async move {
                let stops = store.trip_stops(trip_id).await?;
                Ok::<_, ServiceError>(stops.into_iter().map(StopView::from).collect())
            })
            .await
    }

    /// Stops of public trips around a point, nearest first. Not cached: the
    /// key space is every coordinate.
    pub async fn nearby_stops(
        &self,
        lat: f64,
        lng: f64,
        max_distance_m: f64,
    ) -> ServiceResult<Vec<StopView>> {
        let stops = self
            .store
            .nearby_public_stops(lat, lng, max_distance_m)
            .await?;
        Ok(stops.into_iter().map(StopView::from).collect())
    }
}
