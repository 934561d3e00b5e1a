pub mod activities;
pub mod admin;
pub mod health;
pub mod stops;
pub mod trips;
