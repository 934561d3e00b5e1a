pub mod auth;
pub mod cache;
pub mod itinerary;
pub mod rate_limit;
