/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to clone: services hold Arcs and a shared Cache handle
 */
use std::sync::Arc;

use crate::services::auth::AuthService;
use crate::services::itinerary::{ActivityService, AdminService, StopService, TripService};
use crate::services::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<TripService>,
    pub stops: Arc<StopService>,
    pub activities: Arc<ActivityService>,
    pub admin: Arc<AdminService>,
    pub auth: Arc<AuthService>,
    pub rate_limiter: Arc<RateLimiter>,
    // X-Forwarded-For is only honoured behind a trusted proxy.
    pub trust_proxy: bool,
}
