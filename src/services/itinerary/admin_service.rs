use std::sync::Arc;

use crate::models::{AdminStats, Page, Pagination, TripView, User};
use crate::repos::ItineraryStore;
use crate::services::cache::{Cache, CacheKey};
use crate::services::itinerary::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn ItineraryStore>,
    cache: Cache,
}

impl AdminService {
    pub fn new(store: Arc<dyn ItineraryStore>, cache: Cache) -> Self {
        Self { store, cache }
    }

    pub async fn stats(&self) -> ServiceResult<AdminStats> {
        let store = self.store.as_ref();
        self.cache
            .get_or_load(&CacheKey::AdminStats, move || async move {
                let totals = store.totals().await?;
                Ok::<_, ServiceError>(AdminStats::from(totals))
            })
            .await
    }

    pub async fn users(&self, page: Pagination) -> ServiceResult<Page<User>> {
        let (users, total) = self.store.users(page).await?;
        Ok(Page::new(page, total, users))
    }

    /// Every trip, private ones included.
    pub async fn trips(&self, page: Pagination) -> ServiceResult<Page<TripView>> {
        let (trips, total) = self.store.all_trips(page).await?;
        Ok(Page::new(
            page,
            total,
            trips.into_iter().map(TripView::from).collect(),
        ))
    }
}
