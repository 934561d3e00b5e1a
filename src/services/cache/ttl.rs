use std::time::Duration;

use crate::services::cache::keys::CacheKey;

/// Expiry per key template. Defaults match what the deployed store already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub public_trips: Duration,
    pub public_trip: Duration,
    pub user_trips: Duration,
    pub admin_stats: Duration,
    pub trip_stops: Duration,
    pub stop_activities: Duration,
    pub lock: Duration,
    pub rate_limit_window: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            public_trips: Duration::from_secs(5 * 60),
            public_trip: Duration::from_secs(30 * 60),
            user_trips: Duration::from_secs(2 * 60),
            admin_stats: Duration::from_secs(10 * 60),
            trip_stops: Duration::from_secs(15 * 60),
            stop_activities: Duration::from_secs(10 * 60),
            lock: Duration::from_secs(30),
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

impl CacheTtls {
    pub fn for_key(&self, key: &CacheKey) -> Duration {
        match key {
            CacheKey::PublicTrips { .. } => self.public_trips,
            CacheKey::PublicTrip(_) => self.public_trip,
            CacheKey::UserTrips { .. } => self.user_trips,
            CacheKey::AdminStats => self.admin_stats,
            CacheKey::TripStops(_) => self.trip_stops,
            CacheKey::StopActivities(_) => self.stop_activities,
            CacheKey::RateLimit(_) => self.rate_limit_window,
            CacheKey::Lock(_) => self.lock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_template() {
        let ttls = CacheTtls::default();
        assert_eq!(
            ttls.for_key(&CacheKey::PublicTrips { page: 1, limit: 20 }),
            Duration::from_secs(300)
        );
        assert_eq!(
            ttls.for_key(&CacheKey::PublicTrip("t".into())),
            Duration::from_secs(1800)
        );
        assert_eq!(ttls.for_key(&CacheKey::AdminStats), Duration::from_secs(600));
        assert_eq!(
            ttls.for_key(&CacheKey::Lock("x".into())),
            Duration::from_secs(30)
        );
    }
}
