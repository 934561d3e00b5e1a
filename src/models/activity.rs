use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CATEGORIES: [&str; 7] = [
    "food",
    "transport",
    "accommodation",
    "sightseeing",
    "entertainment",
    "shopping",
    "other",
];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub stop_id: Uuid,
    pub title: String,
    pub description: String,
    pub cost: f64,
    pub currency: String,
    // Day relative to the stop's arrival (0 = arrival day).
    pub day_offset: i32,
    // "HH:MM"
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: String,
    pub notes: String,
    pub booking_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub stop_id: Uuid,
    pub title: String,
    pub description: String,
    pub cost: f64,
    pub currency: String,
    pub day_offset: i32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: String,
    pub notes: String,
    pub booking_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub currency: Option<String>,
    pub day_offset: Option<i32>,
    pub start_time: Option<Option<String>>,
    pub end_time: Option<Option<String>>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub booking_url: Option<Option<String>>,
}

impl ActivityPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.cost.is_none()
            && self.currency.is_none()
            && self.day_offset.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.category.is_none()
            && self.notes.is_none()
            && self.booking_url.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityView {
    pub id: Uuid,
    pub stop_id: Uuid,
    pub title: String,
    pub description: String,
    pub cost: f64,
    pub currency: String,
    pub day_offset: i32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: String,
    pub notes: String,
    pub booking_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Activity> for ActivityView {
    fn from(a: Activity) -> Self {
        Self {
            id: a.id,
            stop_id: a.stop_id,
            title: a.title,
            description: a.description,
            cost: a.cost,
            currency: a.currency,
            day_offset: a.day_offset,
            start_time: a.start_time,
            end_time: a.end_time,
            category: a.category,
            notes: a.notes,
            booking_url: a.booking_url,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
