//! In-process `ItineraryStore` for tests. Mirrors the Postgres behaviour that
//! services rely on: computed counts, cascading deletes and newest-first lists.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::models::{
    Activity, ActivityPatch, NewActivity, NewStop, NewTrip, Pagination, Stop, StopPatch, Totals,
    Trip, TripPatch, User,
};
use crate::repos::stop_repo::NEARBY_LIMIT;
use crate::repos::{ItineraryStore, RepoError, RepoResult};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

fn distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let cos = p1.cos() * p2.cos() * (lng2.to_radians() - lng1.to_radians()).cos()
        + p1.sin() * p2.sin();
    EARTH_RADIUS_M * cos.min(1.0).acos()
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    trips: HashMap<Uuid, Trip>,
    stops: HashMap<Uuid, Stop>,
    activities: HashMap<Uuid, Activity>,
}

impl Tables {
    fn trip_row(&self, trip: &Trip) -> Trip {
        let mut trip = trip.clone();
        trip.stops_count = self.stops.values().filter(|s| s.trip_id == trip.id).count() as i64;
        trip
    }

    fn stop_row(&self, stop: &Stop) -> Stop {
        let mut stop = stop.clone();
        stop.activities_count = self
            .activities
            .values()
            .filter(|a| a.stop_id == stop.id)
            .count() as i64;
        stop
    }

    fn page_of(&self, mut trips: Vec<&Trip>, page: Pagination) -> (Vec<Trip>, i64) {
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = trips.len() as i64;
        let rows = trips
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .map(|t| self.trip_row(t))
            .collect();
        (rows, total)
    }
}

#[derive(Default)]
pub struct MemoryItineraryStore {
    tables: Mutex<Tables>,
    list_reads: AtomicUsize,
}

impl MemoryItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_users(&self, n: usize) {
        let mut t = self.tables.lock().unwrap();
        for _ in 0..n {
            let id = Uuid::new_v4();
            t.users.push(User {
                id,
                email: format!("{id}@example.com"),
                name: "Traveller".into(),
                role: "user".into(),
                created_at: Utc::now(),
            });
        }
    }

    /// Number of list/aggregate queries served so far.
    pub fn list_reads(&self) -> usize {
        self.list_reads.load(Ordering::SeqCst)
    }

    fn counted(&self) {
        self.list_reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ItineraryStore for MemoryItineraryStore {
    async fn insert_trip(&self, new: &NewTrip) -> RepoResult<Trip> {
        let now = Utc::now();
        let trip = Trip {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            name: new.name.clone(),
            description: new.description.clone(),
            start_date: new.start_date,
            end_date: new.end_date,
            is_public: new.is_public,
            cover_image: new.cover_image.clone(),
            total_budget: new.total_budget,
            currency: new.currency.clone(),
            share_token: new.share_token.clone(),
            view_count: 0,
            stops_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn trip(&self, trip_id: Uuid) -> RepoResult<Option<Trip>> {
        let t = self.tables.lock().unwrap();
        Ok(t.trips.get(&trip_id).map(|trip| t.trip_row(trip)))
    }

    async fn public_trip_by_share_token(&self, token: &str) -> RepoResult<Option<Trip>> {
        let t = self.tables.lock().unwrap();
        Ok(t
            .trips
            .values()
            .find(|trip| trip.is_public && trip.share_token.as_deref() == Some(token))
            .map(|trip| t.trip_row(trip)))
    }

    async fn update_trip(&self, trip_id: Uuid, patch: &TripPatch) -> RepoResult<Trip> {
        let mut t = self.tables.lock().unwrap();
        let trip = t.trips.get_mut(&trip_id).ok_or(RepoError::NotFound)?;
        if let Some(v) = &patch.name {
            trip.name = v.clone();
        }
        if let Some(v) = &patch.description {
            trip.description = v.clone();
        }
        if let Some(v) = patch.start_date {
            trip.start_date = v;
        }
        if let Some(v) = patch.end_date {
            trip.end_date = v;
        }
        if let Some(v) = patch.is_public {
            trip.is_public = v;
        }
        if let Some(v) = &patch.cover_image {
            trip.cover_image = v.clone();
        }
        if let Some(v) = patch.total_budget {
            trip.total_budget = v;
        }
        if let Some(v) = &patch.currency {
            trip.currency = v.clone();
        }
        if let Some(v) = &patch.share_token {
            trip.share_token = v.clone();
        }
        trip.updated_at = Utc::now();
        let trip = trip.clone();
        Ok(t.trip_row(&trip))
    }

    async fn delete_trip(&self, trip_id: Uuid) -> RepoResult<()> {
        let mut t = self.tables.lock().unwrap();
        t.trips.remove(&trip_id).ok_or(RepoError::NotFound)?;
        let stop_ids: Vec<Uuid> = t
            .stops
            .values()
            .filter(|s| s.trip_id == trip_id)
            .map(|s| s.id)
            .collect();
        t.stops.retain(|_, s| s.trip_id != trip_id);
        t.activities.retain(|_, a| !stop_ids.contains(&a.stop_id));
        Ok(())
    }

    async fn user_trips(&self, user_id: Uuid, page: Pagination) -> RepoResult<(Vec<Trip>, i64)> {
        self.counted();
        let t = self.tables.lock().unwrap();
        let mine = t.trips.values().filter(|trip| trip.user_id == user_id).collect();
        Ok(t.page_of(mine, page))
    }

    async fn public_trips(&self, page: Pagination) -> RepoResult<(Vec<Trip>, i64)> {
        self.counted();
        let t = self.tables.lock().unwrap();
        let public = t.trips.values().filter(|trip| trip.is_public).collect();
        Ok(t.page_of(public, page))
    }

    async fn all_trips(&self, page: Pagination) -> RepoResult<(Vec<Trip>, i64)> {
        self.counted();
        let t = self.tables.lock().unwrap();
        Ok(t.page_of(t.trips.values().collect(), page))
    }

    async fn increment_view_count(&self, trip_id: Uuid) -> RepoResult<()> {
        if let Some(trip) = self.tables.lock().unwrap().trips.get_mut(&trip_id) {
            trip.view_count += 1;
        }
        Ok(())
    }

    async fn insert_stop(&self, new: &NewStop) -> RepoResult<Stop> {
        let now = Utc::now();
        let stop = Stop {
            id: Uuid::new_v4(),
            trip_id: new.trip_id,
            city: new.city.clone(),
            country: new.country.clone(),
            lat: new.lat,
            lng: new.lng,
            arrival_date: new.arrival_date,
            departure_date: new.departure_date,
            position: new.position,
            notes: new.notes.clone(),
            activities_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().stops.insert(stop.id, stop.clone());
        Ok(stop)
    }

    async fn stop(&self, stop_id: Uuid) -> RepoResult<Option<Stop>> {
        let t = self.tables.lock().unwrap();
        Ok(t.stops.get(&stop_id).map(|s| t.stop_row(s)))
    }

    async fn update_stop(&self, stop_id: Uuid, patch: &StopPatch) -> RepoResult<Stop> {
        let mut t = self.tables.lock().unwrap();
        let stop = t.stops.get_mut(&stop_id).ok_or(RepoError::NotFound)?;
        if let Some(v) = &patch.city {
            stop.city = v.clone();
        }
        if let Some(v) = &patch.country {
            stop.country = v.clone();
        }
        if let Some(v) = patch.lat {
            stop.lat = v;
        }
        if let Some(v) = patch.lng {
            stop.lng = v;
        }
        if let Some(v) = patch.arrival_date {
            stop.arrival_date = v;
        }
        if let Some(v) = patch.departure_date {
            stop.departure_date = v;
        }
        if let Some(v) = patch.position {
            stop.position = v;
        }
        if let Some(v) = &patch.notes {
            stop.notes = v.clone();
        }
        stop.updated_at = Utc::now();
        let stop = stop.clone();
        Ok(t.stop_row(&stop))
    }

    async fn delete_stop(&self, stop_id: Uuid) -> RepoResult<()> {
        let mut t = self.tables.lock().unwrap();
        t.stops.remove(&stop_id).ok_or(RepoError::NotFound)?;
        t.activities.retain(|_, a| a.stop_id != stop_id);
        Ok(())
    }

    async fn trip_stops(&self, trip_id: Uuid) -> RepoResult<Vec<Stop>> {
        self.counted();
        let t = self.tables.lock().unwrap();
        let mut stops: Vec<Stop> = t
            .stops
            .values()
            .filter(|s| s.trip_id == trip_id)
            .map(|s| t.stop_row(s))
            .collect();
        stops.sort_by_key(|s| (s.position, s.arrival_date));
        Ok(stops)
    }

    async fn nearby_public_stops(
        &self,
        lat: f64,
        lng: f64,
        max_distance_m: f64,
    ) -> RepoResult<Vec<Stop>> {
        self.counted();
        let t = self.tables.lock().unwrap();
        let mut hits: Vec<(f64, Stop)> = t
            .stops
            .values()
            .filter(|s| t.trips.get(&s.trip_id).is_some_and(|trip| trip.is_public))
            .map(|s| (distance_m(lat, lng, s.lat, s.lng), s))
            .filter(|(d, _)| *d <= max_distance_m)
            .map(|(d, s)| (d, t.stop_row(s)))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(hits.into_iter().take(NEARBY_LIMIT).map(|(_, s)| s).collect())
    }

    async fn insert_activity(&self, new: &NewActivity) -> RepoResult<Activity> {
        let now = Utc::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            stop_id: new.stop_id,
            title: new.title.clone(),
            description: new.description.clone(),
            cost: new.cost,
            currency: new.currency.clone(),
            day_offset: new.day_offset,
            start_time: new.start_time.clone(),
            end_time: new.end_time.clone(),
            category: new.category.clone(),
            notes: new.notes.clone(),
            booking_url: new.booking_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .activities
            .insert(activity.id, activity.clone());
        Ok(activity)
    }

    async fn activity(&self, activity_id: Uuid) -> RepoResult<Option<Activity>> {
        Ok(self.tables.lock().unwrap().activities.get(&activity_id).cloned())
    }

    async fn update_activity(
        &self,
        activity_id: Uuid,
        patch: &ActivityPatch,
    ) -> RepoResult<Activity> {
        let mut t = self.tables.lock().unwrap();
        let a = t.activities.get_mut(&activity_id).ok_or(RepoError::NotFound)?;
        if let Some(v) = &patch.title {
            a.title = v.clone();
        }
        if let Some(v) = &patch.description {
            a.description = v.clone();
        }
        if let Some(v) = patch.cost {
            a.cost = v;
        }
        if let Some(v) = &patch.currency {
            a.currency = v.clone();
        }
        if let Some(v) = patch.day_offset {
            a.day_offset = v;
        }
        if let Some(v) = &patch.start_time {
            a.start_time = v.clone();
        }
        if let Some(v) = &patch.end_time {
            a.end_time = v.clone();
        }
        if let Some(v) = &patch.category {
            a.category = v.clone();
        }
        if let Some(v) = &patch.notes {
            a.notes = v.clone();
        }
        if let Some(v) = &patch.booking_url {
            a.booking_url = v.clone();
        }
        a.updated_at = Utc::now();
        Ok(a.clone())
    }

    async fn delete_activity(&self, activity_id: Uuid) -> RepoResult<()> {
        self.tables
            .lock()
            .unwrap()
            .activities
            .remove(&activity_id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn stop_activities(&self, stop_id: Uuid) -> RepoResult<Vec<Activity>> {
        self.counted();
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Activity> = t
            .activities
            .values()
            .filter(|a| a.stop_id == stop_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (a.day_offset, &a.start_time, a.created_at).cmp(&(b.day_offset, &b.start_time, b.created_at))
        });
        Ok(rows)
    }

    async fn users(&self, page: Pagination) -> RepoResult<(Vec<User>, i64)> {
        self.counted();
        let t = self.tables.lock().unwrap();
        let mut users = t.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = users.len() as i64;
        let rows = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((rows, total))
    }

    async fn totals(&self) -> RepoResult<Totals> {
        self.counted();
        let t = self.tables.lock().unwrap();
        let trips = t.trips.len() as i64;
        let average_budget = (trips > 0)
            .then(|| t.trips.values().map(|trip| trip.total_budget).sum::<f64>() / trips as f64);
        Ok(Totals {
            users: t.users.len() as i64,
            trips,
            public_trips: t.trips.values().filter(|trip| trip.is_public).count() as i64,
            stops: t.stops.len() as i64,
            activities: t.activities.len() as i64,
            average_budget,
        })
    }
}
