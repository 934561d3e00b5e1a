//! Ownership and visibility checks, always decided against the store.
use uuid::Uuid;

use crate::models::{Stop, Trip};
use crate::repos::ItineraryStore;
use crate::services::itinerary::error::{ServiceError, ServiceResult};

/// Trip readable by `viewer`: public, or owned by the viewer.
pub async fn visible_trip(
    store: &dyn ItineraryStore,
    trip_id: Uuid,
    viewer: Option<Uuid>,
) -> ServiceResult<Trip> {
    let trip = store
        .trip(trip_id)
        .await?
        .ok_or(ServiceError::NotFound("trip"))?;
    if !trip.is_visible_to(viewer) {
        return Err(ServiceError::Forbidden);
    }
    Ok(trip)
}

pub async fn owned_trip(
    store: &dyn ItineraryStore,
    trip_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<Trip> {
    let trip = store
        .trip(trip_id)
        .await?
        .ok_or(ServiceError::NotFound("trip"))?;
    if trip.user_id != user_id {
        return Err(ServiceError::Forbidden);
    }
    Ok(trip)
}

pub async fn visible_stop(
    store: &dyn ItineraryStore,
    stop_id: Uuid,
    viewer: Option<Uuid>,
) -> ServiceResult<(Stop, Trip)> {
    let stop = store
        .stop(stop_id)
        .await?
        .ok_or(ServiceError::NotFound("stop"))?;
    let trip = visible_trip(store, stop.trip_id, viewer).await?;
    Ok((stop, trip))
}

pub async fn owned_stop(
    store: &dyn ItineraryStore,
    stop_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<(Stop, Trip)> {
    let stop = store
        .stop(stop_id)
        .await?
        .ok_or(ServiceError::NotFound("stop"))?;
    let trip = owned_trip(store, stop.trip_id, user_id).await?;
    Ok((stop, trip))
}
