/*
 * Responsibility
 * - Use cases over trips, stops and activities
 * - Cache-aside reads, invalidation after every committed write
 * - Ownership/visibility decided against the store, never against the cache
 */
pub mod access;
pub mod activity_service;
pub mod admin_service;
pub mod error;
pub mod stop_service;
#[cfg(test)]
pub mod testing;
pub mod trip_service;

pub use activity_service::ActivityService;
pub use admin_service::AdminService;
pub use error::ServiceError;
pub use stop_service::StopService;
pub use trip_service::TripService;
