use serde::{Deserialize, Serialize};

/// Raw counters read from the database.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct Totals {
    pub users: i64,
    pub trips: i64,
    pub public_trips: i64,
    pub stops: i64,
    pub activities: i64,
    pub average_budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_trips: i64,
    pub public_trips: i64,
    pub total_stops: i64,
    pub total_activities: i64,
    pub average_budget: f64,
}

impl From<Totals> for AdminStats {
    fn from(t: Totals) -> Self {
        Self {
            total_users: t.users,
            total_trips: t.trips,
            public_trips: t.public_trips,
            total_stops: t.stops,
            total_activities: t.activities,
            average_budget: t.average_budget.unwrap_or(0.0),
        }
    }
}
