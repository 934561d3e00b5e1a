use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::stops::{CreateStopRequest, NearbyQuery, UpdateStopRequest},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    models::StopView,
    state::AppState,
};

pub async fn list_trip_stops(
    State(state): State<AppState>,
    auth: Option<AuthCtxExtractor>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<StopView>>, AppError> {
    let viewer = auth.map(|AuthCtxExtractor(a)| a.user_id);
    Ok(Json(state.stops.list_trip_stops(trip_id, viewer).await?))
}

pub async fn create_stop(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<CreateStopRequest>,
) -> Result<(StatusCode, Json<StopView>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let stop = state
        .stops
        .create_stop(auth.user_id, req.into_new_stop(trip_id))
        .await?;
    Ok((StatusCode::CREATED, Json(stop)))
}

pub async fn nearby_stops(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<Vec<StopView>>, AppError> {
    let Query(q) =
        query.map_err(|_| AppError::validation("lat, lng and maxDistance must be numbers"))?;
    let (lat, lng, radius) = q.validate().map_err(AppError::validation)?;
    Ok(Json(state.stops.nearby_stops(lat, lng, radius).await?))
}

pub async fn get_stop(
    State(state): State<AppState>,
    auth: Option<AuthCtxExtractor>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<StopView>, AppError> {
    let viewer = auth.map(|AuthCtxExtractor(a)| a.user_id);
    Ok(Json(state.stops.get_stop(stop_id, viewer).await?))
}

pub async fn update_stop(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(stop_id): Path<Uuid>,
    Json(req): Json<UpdateStopRequest>,
) -> Result<Json<StopView>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let stop = state
        .stops
        .update_stop(stop_id, auth.user_id, req.into_patch())
        .await?;
    Ok(Json(stop))
}

pub async fn delete_stop(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(stop_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.stops.delete_stop(stop_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
