/*
 * Responsibility
 * - v1 URL structure
 * - Anonymous reads: /health, /trips/public, /trips/share/{token},
 *   /stops/nearby and the single-resource GETs (public trips only)
 * - /admin/... additionally needs the admin role (403 otherwise)
 * - Everything else needs a bearer token; AuthCtxExtractor rejects with 401
 */
use axum::{
    Router,
    routing::get,
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    activities::{
        create_activity, delete_activity, get_activity, list_stop_activities, update_activity,
    },
    admin,
    health::health,
    stops::{create_stop, delete_stop, get_stop, list_trip_stops, nearby_stops, update_stop},
    trips::{
        create_trip, delete_trip, get_shared_trip, get_trip, list_my_trips, list_public_trips,
        update_trip,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/trips/public", get(list_public_trips))
        .route("/trips/share/{token}", get(get_shared_trip))
        .route("/trips", get(list_my_trips).post(create_trip))
        .route(
            "/trips/{trip_id}",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route(
            "/trips/{trip_id}/stops",
            get(list_trip_stops).post(create_stop),
        )
        .route("/stops/nearby", get(nearby_stops))
        .route(
            "/stops/{stop_id}",
            get(get_stop).put(update_stop).delete(delete_stop),
        )
        .route(
            "/stops/{stop_id}/activities",
            get(list_stop_activities).post(create_activity),
        )
        .route(
            "/activities/{activity_id}",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::users))
        .route("/admin/trips", get(admin::trips))
}
