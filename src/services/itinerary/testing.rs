//! Wiring for service tests: in-memory itinerary store and cache.
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{NewActivity, NewStop, NewTrip};
use crate::repos::memory::MemoryItineraryStore;
use crate::services::cache::memory::MemoryStore;
use crate::services::cache::{Cache, CacheTtls, Invalidator, KvStore, LockManager};
use crate::services::auth::AuthService;
use crate::services::itinerary::{ActivityService, AdminService, StopService, TripService};
use crate::services::rate_limit::RateLimiter;
use crate::state::AppState;

pub struct Harness {
    pub store: Arc<MemoryItineraryStore>,
    pub cache: Cache,
    pub locks: LockManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_kv(Arc::new(MemoryStore::new()))
    }

    pub fn with_kv(kv: Arc<dyn KvStore>) -> Self {
        let cache = Cache::new(kv, CacheTtls::default());
        Self {
            store: Arc::new(MemoryItineraryStore::new()),
            locks: LockManager::new(cache.clone()),
            cache,
        }
    }

    pub fn trips(&self) -> TripService {
        TripService::new(
            self.store.clone(),
            self.cache.clone(),
            self.locks.clone(),
            Invalidator::new(self.cache.clone()),
        )
    }

    pub fn stops(&self) -> StopService {
        StopService::new(
            self.store.clone(),
            self.cache.clone(),
            Invalidator::new(self.cache.clone()),
        )
    }

    pub fn activities(&self) -> ActivityService {
        ActivityService::new(
            self.store.clone(),
            self.cache.clone(),
            Invalidator::new(self.cache.clone()),
        )
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.store.clone(), self.cache.clone())
    }

    /// Router state over the same store and cache.
    pub fn app_state(&self) -> AppState {
        AppState {
            trips: Arc::new(self.trips()),
            stops: Arc::new(self.stops()),
            activities: Arc::new(self.activities()),
            admin: Arc::new(self.admin()),
            auth: Arc::new(AuthService::new("test-secret", None, 0)),
            rate_limiter: Arc::new(RateLimiter::new(self.cache.clone(), 1000)),
            trust_proxy: false,
        }
    }
}

pub fn new_trip(user_id: Uuid, is_public: bool) -> NewTrip {
    let start = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    NewTrip {
        user_id,
        name: "Iberia loop".into(),
        description: "Lisbon, Porto, Seville".into(),
        start_date: start,
        end_date: start + ChronoDuration::days(14),
        is_public,
        cover_image: None,
        total_budget: 2400.0,
        currency: "EUR".into(),
        share_token: None,
    }
}

pub fn new_stop(trip_id: Uuid) -> NewStop {
    let arrival = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    NewStop {
        trip_id,
        city: "Lisbon".into(),
        country: "Portugal".into(),
        lat: 38.72,
        lng: -9.14,
        arrival_date: arrival,
        departure_date: arrival + ChronoDuration::days(4),
        position: 1,
        notes: String::new(),
    }
}

pub fn new_activity(stop_id: Uuid) -> NewActivity {
    NewActivity {
        stop_id,
        title: "Tram 28".into(),
        description: String::new(),
        cost: 3.0,
        currency: "EUR".into(),
        day_offset: 0,
        start_time: Some("10:00".into()),
        end_time: None,
        category: "sightseeing".into(),
        notes: String::new(),
        booking_url: None,
    }
}
