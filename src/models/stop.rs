use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Stop {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub position: i32,
    pub notes: String,
    // Computed by the query, not a column.
    pub activities_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStop {
    pub trip_id: Uuid,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub position: i32,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct StopPatch {
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub departure_date: Option<DateTime<Utc>>,
    pub position: Option<i32>,
    pub notes: Option<String>,
}

impl StopPatch {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.country.is_none()
            && self.lat.is_none()
            && self.lng.is_none()
            && self.arrival_date.is_none()
            && self.departure_date.is_none()
            && self.position.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopView {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub position: i32,
    pub notes: String,
    pub activities_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Stop> for StopView {
    fn from(s: Stop) -> Self {
        Self {
            id: s.id,
            trip_id: s.trip_id,
            city: s.city,
            country: s.country,
            lat: s.lat,
            lng: s.lng,
            arrival_date: s.arrival_date,
            departure_date: s.departure_date,
            position: s.position,
            notes: s.notes,
            activities_count: s.activities_count,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
