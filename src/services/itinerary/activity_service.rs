use std::sync::Arc;
use uuid::Uuid;

use crate::models::activity::CATEGORIES;
use crate::models::{Activity, ActivityPatch, ActivityView, NewActivity, Trip};
use crate::repos::ItineraryStore;
use crate::services::cache::invalidation::{ActivityChange, activity_changed};
use crate::services::cache::{Cache, CacheKey, ChangeKind, Invalidator};
use crate::services::itinerary::access::{owned_stop, visible_stop};
use crate::services::itinerary::error::{ServiceError, ServiceResult};

fn check_category(category: &str) -> ServiceResult<()> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "category must be one of: {}",
            CATEGORIES.join(", ")
        )))
    }
}

#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn ItineraryStore>,
    cache: Cache,
    invalidator: Invalidator,
}

impl ActivityService {
    pub fn new(store: Arc<dyn ItineraryStore>, cache: Cache, invalidator: Invalidator) -> Self {
        Self {
            store,
            cache,
            invalidator,
        }
    }

    async fn owned_activity(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<(Activity, Trip)> {
        let activity = self
            .store
            .activity(activity_id)
            .await?
            .ok_or(ServiceError::NotFound("activity"))?;
        let (_, trip) = owned_stop(self.store.as_ref(), activity.stop_id, user_id).await?;
        Ok((activity, trip))
    }

    async fn invalidate(&self, stop_id: Uuid, trip_id: Uuid, kind: ChangeKind) {
        self.invalidator
            .apply_best_effort(&activity_changed(&ActivityChange {
                stop_id,
                trip_id,
                kind,
            }))
            .await;
    }

    pub async fn create_activity(
        &self,
        user_id: Uuid,
        new: NewActivity,
    ) -> ServiceResult<ActivityView> {
        let (stop, _) = owned_stop(self.store.as_ref(), new.stop_id, user_id).await?;
        check_category(&new.category)?;

        let activity = self.store.insert_activity(&new).await?;
        self.invalidate(stop.id, stop.trip_id, ChangeKind::Created)
            .await;

        tracing::info!(activity_id = %activity.id, stop_id = %stop.id, "activity created");
        Ok(activity.into())
    }

    pub async fn get_activity(
        &self,
        activity_id: Uuid,
        viewer: Option<Uuid>,
    ) -> ServiceResult<ActivityView> {
        let activity = self
            .store
            .activity(activity_id)
            .await?
            .ok_or(ServiceError::NotFound("activity"))?;
        visible_stop(self.store.as_ref(), activity.stop_id, viewer).await?;
        Ok(activity.into())
    }

    pub async fn update_activity(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
        patch: ActivityPatch,
    ) -> ServiceResult<ActivityView> {
        if patch.is_empty() {
            return Err(ServiceError::validation("no fields to update"));
        }
        if let Some(category) = &patch.category {
            check_category(category)?;
        }
        let (before, trip) = self.owned_activity(activity_id, user_id).await?;

        let activity = self
            .store
            .update_activity(activity_id, &patch)
            .await
            .map_err(ServiceError::or_missing("activity"))?;
        self.invalidate(before.stop_id, trip.id, ChangeKind::Updated)
            .await;

        Ok(activity.into())
    }

    pub async fn delete_activity(&self, activity_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let (activity, trip) = self.owned_activity(activity_id, user_id).await?;

        self.store
            .delete_activity(activity_id)
            .await
            .map_err(ServiceError::or_missing("activity"))?;
        self.invalidate(activity.stop_id, trip.id, ChangeKind::Deleted)
            .await;

        tracing::info!(%activity_id, "activity deleted");
        Ok(())
    }

    pub async fn list_stop_activities(
        &self,
        stop_id: Uuid,
        viewer: Option<Uuid>,
    ) -> ServiceResult<Vec<ActivityView>> {
        visible_stop(self.store.as_ref(), stop_id, viewer).await?;

        let store = self.store.as_ref();
        self.cache
            .get_or_load(&CacheKey::StopActivities(stop_id), move || async move {
                let rows = store.stop_activities(stop_id).await?;
                Ok::<_, ServiceError>(rows.into_iter().map(ActivityView::from).collect())
            })
            .await
    }
}
