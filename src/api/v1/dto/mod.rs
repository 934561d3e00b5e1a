/*
 * Responsibility
 * - Request DTOs and their shape checks (validate())
 * - Responses are the model views (TripView, StopView, ...) as-is
 */
pub mod activities;
pub mod stops;
pub mod trips;

use serde::{Deserialize, Deserializer};

/// Tri-state field:
/// - missing: `None` (do not update), needs `#[serde(default)]`
/// - null: `Some(None)` (clear)
/// - value: `Some(Some(v))`
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
