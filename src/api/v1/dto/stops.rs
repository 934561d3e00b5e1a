use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{NewStop, StopPatch};

fn valid_coords(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

#[derive(Debug, Deserialize)]
pub struct CreateStopRequest {
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    pub arrival_date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub notes: String,
}

impl CreateStopRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.city.trim().is_empty() {
            return Err("city is required");
        }
        if self.country.trim().is_empty() {
            return Err("country is required");
        }
        if !valid_coords(self.lat, self.lng) {
            return Err("lat/lng out of range");
        }
        if self.position < 0 {
            return Err("position must not be negative");
        }
        Ok(())
    }

    pub fn into_new_stop(self, trip_id: Uuid) -> NewStop {
        NewStop {
            trip_id,
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
            lat: self.lat,
            lng: self.lng,
            arrival_date: self.arrival_date,
            departure_date: self.departure_date,
            position: self.position,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStopRequest {
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub departure_date: Option<DateTime<Utc>>,
    pub position: Option<i32>,
    pub notes: Option<String>,
}

impl UpdateStopRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(city) = &self.city
            && city.trim().is_empty()
        {
            return Err("city cannot be empty");
        }
        if let Some(country) = &self.country
            && country.trim().is_empty()
        {
            return Err("country cannot be empty");
        }
        if !valid_coords(self.lat.unwrap_or(0.0), self.lng.unwrap_or(0.0)) {
            return Err("lat/lng out of range");
        }
        if let Some(position) = self.position
            && position < 0
        {
            return Err("position must not be negative");
        }
        Ok(())
    }

    pub fn into_patch(self) -> StopPatch {
        StopPatch {
            city: self.city.map(|c| c.trim().to_string()),
            country: self.country.map(|c| c.trim().to_string()),
            lat: self.lat,
            lng: self.lng,
            arrival_date: self.arrival_date,
            departure_date: self.departure_date,
            position: self.position,
            notes: self.notes,
        }
    }
}

pub const DEFAULT_NEARBY_RADIUS_M: f64 = 10_000.0;

/// `?lat=&lng=&maxDistance=` with the radius in meters.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "maxDistance")]
    pub max_distance: Option<f64>,
}

impl NearbyQuery {
    /// Returns `(lat, lng, radius_m)`.
    pub fn validate(&self) -> Result<(f64, f64, f64), &'static str> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return Err("lat and lng query parameters are required");
        };
        if !valid_coords(lat, lng) {
            return Err("lat/lng out of range");
        }
        let radius = self.max_distance.unwrap_or(DEFAULT_NEARBY_RADIUS_M);
        if !radius.is_finite() || radius <= 0.0 {
            return Err("maxDistance must be a positive number of meters");
        }
        Ok((lat, lng, radius))
    }
}
