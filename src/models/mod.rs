/*
 * Responsibility
 * - Entities as stored in the database (rows)
 * - Views as returned to clients and stored in the cache (JSON)
 */
pub mod activity;
pub mod pagination;
pub mod stats;
pub mod stop;
pub mod trip;
pub mod user;

pub use activity::{Activity, ActivityPatch, ActivityView, NewActivity};
pub use pagination::{Page, Pagination};
pub use stats::{AdminStats, Totals};
pub use stop::{NewStop, Stop, StopPatch, StopView};
pub use trip::{NewTrip, PublicTripView, Trip, TripPatch, TripView};
pub use user::User;
