//! Canonical cache key templates.
//!
//! Every key the application reads, writes or invalidates is built here, so the
//! read paths and the invalidation policy cannot drift apart. The rendered
//! strings are part of the store contract and must not change shape.
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `public_trips:{page}:{limit}`
    PublicTrips { page: u32, limit: u32 },
    /// `public_trip:{trip id or share token}`
    PublicTrip(String),
    /// `user_trips:{user_id}:{page}:{limit}`
    UserTrips { user_id: Uuid, page: u32, limit: u32 },
    /// `admin_stats`
    AdminStats,
    /// `trip_stops:{trip_id}`
    TripStops(Uuid),
    /// `stop_activities:{stop_id}`
    StopActivities(Uuid),
    /// `rate_limit:{identifier}`
    RateLimit(String),
    /// `lock:{resource}`
    Lock(String),
}

impl CacheKey {
    pub fn public_trip_by_id(trip_id: Uuid) -> Self {
        Self::PublicTrip(trip_id.to_string())
    }

    pub fn public_trip_by_token(share_token: &str) -> Self {
        Self::PublicTrip(share_token.to_string())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicTrips { page, limit } => write!(f, "public_trips:{page}:{limit}"),
            Self::PublicTrip(id) => write!(f, "public_trip:{id}"),
            Self::UserTrips {
                user_id,
                page,
                limit,
            } => write!(f, "user_trips:{user_id}:{page}:{limit}"),
            Self::AdminStats => f.write_str("admin_stats"),
            Self::TripStops(trip_id) => write!(f, "trip_stops:{trip_id}"),
            Self::StopActivities(stop_id) => write!(f, "stop_activities:{stop_id}"),
            Self::RateLimit(id) => write!(f, "rate_limit:{id}"),
            Self::Lock(resource) => write!(f, "lock:{resource}"),
        }
    }
}

/// What an invalidation deletes: one exact key, or a family of keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPattern {
    Exact(CacheKey),
    /// `public_trips:*`
    AllPublicTrips,
    /// `user_trips:{user_id}:*`
    AllUserTrips(Uuid),
}

impl KeyPattern {
    pub fn is_glob(&self) -> bool {
        !matches!(self, Self::Exact(_))
    }
}

impl From<CacheKey> for KeyPattern {
    fn from(key: CacheKey) -> Self {
        Self::Exact(key)
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(key) => key.fmt(f),
            Self::AllPublicTrips => f.write_str("public_trips:*"),
            Self::AllUserTrips(user_id) => write!(f, "user_trips:{user_id}:*"),
        }
    }
}
