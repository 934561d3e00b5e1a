use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::double_option;
use crate::models::{NewTrip, TripPatch};

const MAX_NAME: usize = 200;
const MAX_URL: usize = 2048;

fn valid_currency(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub is_public: bool,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub total_budget: f64,
    pub currency: Option<String>,
}

impl CreateTripRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > MAX_NAME {
            return Err("name must be <= 200 chars");
        }
        if self.total_budget < 0.0 {
            return Err("total_budget must not be negative");
        }
        if let Some(code) = &self.currency
            && !valid_currency(code)
        {
            return Err("currency must be a 3-letter ISO code");
        }
        if let Some(url) = &self.cover_image
            && url.len() > MAX_URL
        {
            return Err("cover_image must be <= 2048 chars");
        }
        Ok(())
    }

    pub fn into_new_trip(self, user_id: Uuid) -> NewTrip {
        NewTrip {
            user_id,
            name: self.name.trim().to_string(),
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            is_public: self.is_public,
            cover_image: self.cover_image,
            total_budget: self.total_budget,
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            share_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTripRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image: Option<Option<String>>,
    pub total_budget: Option<f64>,
    pub currency: Option<String>,
}

impl UpdateTripRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name cannot be empty");
            }
            if name.len() > MAX_NAME {
                return Err("name must be <= 200 chars");
            }
        }
        if let Some(budget) = self.total_budget
            && budget < 0.0
        {
            return Err("total_budget must not be negative");
        }
        if let Some(code) = &self.currency
            && !valid_currency(code)
        {
            return Err("currency must be a 3-letter ISO code");
        }
        if let Some(Some(url)) = &self.cover_image
            && url.len() > MAX_URL
        {
            return Err("cover_image must be <= 2048 chars");
        }
        Ok(())
    }

    pub fn into_patch(self) -> TripPatch {
        TripPatch {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            is_public: self.is_public,
            cover_image: self.cover_image,
            total_budget: self.total_budget,
            currency: self.currency,
            // minted/cleared by the service from is_public
            share_token: None,
        }
    }
}
