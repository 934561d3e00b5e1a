/*
 * Responsibility
 * - The authoritative itinerary store as services see it (ItineraryStore)
 * - Postgres implementation delegating to the per-table sqlx functions
 */
pub mod activity_repo;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod stats_repo;
pub mod stop_repo;
pub mod trip_repo;
pub mod user_repo;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Activity, ActivityPatch, NewActivity, NewStop, NewTrip, Pagination, Stop, StopPatch, Totals,
    Trip, TripPatch, User,
};
pub use error::RepoError;

pub type RepoResult<T> = Result<T, RepoError>;

/// Lookups return `Ok(None)` for a missing row; updates and deletes report
/// `RepoError::NotFound`.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn insert_trip(&self, new: &NewTrip) -> RepoResult<Trip>;
    async fn trip(&self, trip_id: Uuid) -> RepoResult<Option<Trip>>;
    async fn public_trip_by_share_token(&self, token: &str) -> RepoResult<Option<Trip>>;
    async fn update_trip(&self, trip_id: Uuid, patch: &TripPatch) -> RepoResult<Trip>;
    async fn delete_trip(&self, trip_id: Uuid) -> RepoResult<()>;
    async fn user_trips(&self, user_id: Uuid, page: Pagination) -> RepoResult<(Vec<Trip>, i64)>;
    async fn public_trips(&self, page: Pagination) -> RepoResult<(Vec<Trip>, i64)>;
    async fn increment_view_count(&self, trip_id: Uuid) -> RepoResult<()>;
    async fn all_trips(&self, page: Pagination) -> RepoResult<(Vec<Trip>, i64)>;

    async fn insert_stop(&self, new: &NewStop) -> RepoResult<Stop>;
    async fn stop(&self, stop_id: Uuid) -> RepoResult<Option<Stop>>;
    async fn update_stop(&self, stop_id: Uuid, patch: &StopPatch) -> RepoResult<Stop>;
    async fn delete_stop(&self, stop_id: Uuid) -> RepoResult<()>;
    async fn trip_stops(&self, trip_id: Uuid) -> RepoResult<Vec<Stop>>;
    /// Stops of public trips within `max_distance_m` meters, nearest first.
    async fn nearby_public_stops(
        &self,
        lat: f64,
        lng: f64,
        max_distance_m: f64,
    ) -> RepoResult<Vec<Stop>>;

    async fn insert_activity(&self, new: &NewActivity) -> RepoResult<Activity>;
    async fn activity(&self, activity_id: Uuid) -> RepoResult<Option<Activity>>;
    async fn update_activity(
        &self,
        activity_id: Uuid,
        patch: &ActivityPatch,
    ) -> RepoResult<Activity>;
    async fn delete_activity(&self, activity_id: Uuid) -> RepoResult<()>;
    async fn stop_activities(&self, stop_id: Uuid) -> RepoResult<Vec<Activity>>;

    async fn users(&self, page: Pagination) -> RepoResult<(Vec<User>, i64)>;
    async fn totals(&self) -> RepoResult<Totals>;
}

#[derive(Clone, Debug)]
pub struct PgItineraryStore {
    db: PgPool,
}

impl PgItineraryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn found(deleted: bool) -> RepoResult<()> {
    if deleted {
        Ok(())
    } else {
        Err(RepoError::NotFound)
    }
}

#[async_trait]
impl ItineraryStore for PgItineraryStore {
    async fn insert_trip(&self, new: &NewTrip) -> RepoResult<Trip> {
        trip_repo::create(&self.db, new).await
    }

    async fn trip(&self, trip_id: Uuid) -> RepoResult<Option<Trip>> {
        trip_repo::get(&self.db, trip_id).await
    }

    async fn public_trip_by_share_token(&self, token: &str) -> RepoResult<Option<Trip>> {
        trip_repo::get_by_share_token(&self.db, token).await
    }

    async fn update_trip(&self, trip_id: Uuid, patch: &TripPatch) -> RepoResult<Trip> {
        trip_repo::update(&self.db, trip_id, patch)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_trip(&self, trip_id: Uuid) -> RepoResult<()> {
        found(trip_repo::delete(&self.db, trip_id).await?)
    }

    async fn user_trips(&self, user_id: Uuid, page: Pagination) -> RepoResult<(Vec<Trip>, i64)> {
        trip_repo::list_by_user(&self.db, user_id, page).await
    }

    async fn public_trips(&self, page: Pagination) -> RepoResult<(Vec<Trip>, i64)> {
        trip_repo::list_public(&self.db, page).await
    }

    async fn increment_view_count(&self, trip_id: Uuid) -> RepoResult<()> {
        trip_repo::increment_view_count(&self.db, trip_id).await
    }

    async fn all_trips(&self, page: Pagination) -> RepoResult<(Vec<Trip>, i64)> {
        trip_repo::list_all(&self.db, page).await
    }

    async fn insert_stop(&self, new: &NewStop) -> RepoResult<Stop> {
        stop_repo::create(&self.db, new).await
    }

    async fn stop(&self, stop_id: Uuid) -> RepoResult<Option<Stop>> {
        stop_repo::get(&self.db, stop_id).await
    }

    async fn update_stop(&self, stop_id: Uuid, patch: &StopPatch) -> RepoResult<Stop> {
        stop_repo::update(&self.db, stop_id, patch)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_stop(&self, stop_id: Uuid) -> RepoResult<()> {
        found(stop_repo::delete(&self.db, stop_id).await?)
    }

    async fn trip_stops(&self, trip_id: Uuid) -> RepoResult<Vec<Stop>> {
        stop_repo::list_by_trip(&self.db, trip_id).await
    }

    async fn nearby_public_stops(
        &self,
        lat: f64,
        lng: f64,
        max_distance_m: f64,
    ) -> RepoResult<Vec<Stop>> {
        stop_repo::nearby_public(&self.db, lat, lng, max_distance_m).await
    }

    async fn insert_activity(&self, new: &NewActivity) -> RepoResult<Activity> {
        activity_repo::create(&self.db, new).await
    }

    async fn activity(&self, activity_id: Uuid) -> RepoResult<Option<Activity>> {
        activity_repo::get(&self.db, activity_id).await
    }

    async fn update_activity(
        &self,
        activity_id: Uuid,
        patch: &ActivityPatch,
    ) -> RepoResult<Activity> {
        activity_repo::update(&self.db, activity_id, patch)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_activity(&self, activity_id: Uuid) -> RepoResult<()> {
        found(activity_repo::delete(&self.db, activity_id).await?)
    }

    async fn stop_activities(&self, stop_id: Uuid) -> RepoResult<Vec<Activity>> {
        activity_repo::list_by_stop(&self.db, stop_id).await
    }

    async fn users(&self, page: Pagination) -> RepoResult<(Vec<User>, i64)> {
        user_repo::list(&self.db, page).await
    }

    async fn totals(&self) -> RepoResult<Totals> {
        stats_repo::totals(&self.db).await
    }
}
