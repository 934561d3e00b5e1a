use serde::Deserialize;
use uuid::Uuid;

use super::double_option;
use crate::models::activity::CATEGORIES;
use crate::models::{ActivityPatch, NewActivity};

// "HH:MM", 24h
fn valid_time(t: &str) -> bool {
    let Some((h, m)) = t.split_once(':') else {
        return false;
    };
    h.len() == 2
        && m.len() == 2
        && h.parse::<u8>().is_ok_and(|h| h < 24)
        && m.parse::<u8>().is_ok_and(|m| m < 60)
}

fn check_time(t: Option<&str>) -> Result<(), &'static str> {
    match t {
        Some(t) if !valid_time(t) => Err("times must be HH:MM"),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: f64,
    pub currency: Option<String>,
    #[serde(default)]
    pub day_offset: i32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub booking_url: Option<String>,
}

impl CreateActivityRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.cost < 0.0 {
            return Err("cost must not be negative");
        }
        if self.day_offset < 0 {
            return Err("day_offset must not be negative");
        }
        check_time(self.start_time.as_deref())?;
        check_time(self.end_time.as_deref())?;
        if let Some(category) = &self.category
            && !CATEGORIES.contains(&category.as_str())
        {
            return Err("unknown category");
        }
        Ok(())
    }

    pub fn into_new_activity(self, stop_id: Uuid) -> NewActivity {
        NewActivity {
            stop_id,
            title: self.title.trim().to_string(),
            description: self.description,
            cost: self.cost,
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            day_offset: self.day_offset,
            start_time: self.start_time,
            end_time: self.end_time,
            category: self.category.unwrap_or_else(|| "other".to_string()),
            notes: self.notes,
            booking_url: self.booking_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateActivityRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub currency: Option<String>,
    pub day_offset: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_time: Option<Option<String>>,
    pub category: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub booking_url: Option<Option<String>>,
}

impl UpdateActivityRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err("title cannot be empty");
        }
        if self.cost.is_some_and(|c| c < 0.0) {
            return Err("cost must not be negative");
        }
        if self.day_offset.is_some_and(|d| d < 0) {
            return Err("day_offset must not be negative");
        }
        check_time(self.start_time.clone().flatten().as_deref())?;
        check_time(self.end_time.clone().flatten().as_deref())?;
        Ok(())
    }

    pub fn into_patch(self) -> ActivityPatch {
        ActivityPatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            cost: self.cost,
            currency: self.currency,
            day_offset: self.day_offset,
            start_time: self.start_time,
            end_time: self.end_time,
            category: self.category,
            notes: self.notes,
            booking_url: self.booking_url,
        }
    }
}
