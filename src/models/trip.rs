use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::cache::TripRef;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_public: bool,
    pub cover_image: Option<String>,
    pub total_budget: f64,
    pub currency: String,
    pub share_token: Option<String>,
    pub view_count: i64,
    // Computed by the query, not a column.
    pub stops_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn trip_ref(&self) -> TripRef {
        TripRef {
            id: self.id,
            owner_id: self.user_id,
            share_token: self.share_token.clone(),
        }
    }

    pub fn is_visible_to(&self, user_id: Option<Uuid>) -> bool {
        self.is_public || user_id == Some(self.user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_public: bool,
    pub cover_image: Option<String>,
    pub total_budget: f64,
    pub currency: String,
    pub share_token: Option<String>,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
    // Tri-state:
    // - None: do not update
    // - Some(None): set NULL
    // - Some(Some(v)): set v
    pub cover_image: Option<Option<String>>,
    pub total_budget: Option<f64>,
    pub currency: Option<String>,
    pub share_token: Option<Option<String>>,
}

impl TripPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.is_public.is_none()
            && self.cover_image.is_none()
            && self.total_budget.is_none()
            && self.currency.is_none()
            && self.share_token.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_public: bool,
    pub cover_image: Option<String>,
    pub total_budget: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub share_token: Option<String>,
    pub view_count: i64,
    pub stops_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Trip> for TripView {
    fn from(t: Trip) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            name: t.name,
            description: t.description,
            start_date: t.start_date,
            end_date: t.end_date,
            is_public: t.is_public,
            cover_image: t.cover_image,
            total_budget: t.total_budget,
            currency: t.currency,
            share_token: t.share_token,
            view_count: t.view_count,
            stops_count: t.stops_count,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// What anonymous readers see of a public trip (no budget, no owner id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicTripView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub cover_image: Option<String>,
    pub share_token: Option<String>,
    pub view_count: i64,
    pub stops_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Trip> for PublicTripView {
    fn from(t: Trip) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            start_date: t.start_date,
            end_date: t.end_date,
            cover_image: t.cover_image,
            share_token: t.share_token,
            view_count: t.view_count,
            stops_count: t.stops_count,
            created_at: t.created_at,
        }
    }
}
