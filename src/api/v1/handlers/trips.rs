/*
 * Responsibility
 * - /trips handlers
 * - Json → DTO validation → TripService; the service owns caching and locking
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::trips::{CreateTripRequest, UpdateTripRequest},
        extractors::{AuthCtxExtractor, PageParams},
    },
    error::AppError,
    models::{Page, PublicTripView, TripView},
    state::AppState,
};

pub async fn list_public_trips(
    State(state): State<AppState>,
    PageParams(page): PageParams,
) -> Result<Json<Page<PublicTripView>>, AppError> {
    Ok(Json(state.trips.list_public_trips(page).await?))
}

pub async fn get_shared_trip(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PublicTripView>, AppError> {
    Ok(Json(state.trips.get_public_trip(&token).await?))
}

pub async fn list_my_trips(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    PageParams(page): PageParams,
) -> Result<Json<Page<TripView>>, AppError> {
    Ok(Json(state.trips.list_user_trips(auth.user_id, page).await?))
}

pub async fn create_trip(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Json(req): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripView>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let trip = state
        .trips
        .create_trip(req.into_new_trip(auth.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn get_trip(
    State(state): State<AppState>,
    auth: Option<AuthCtxExtractor>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripView>, AppError> {
    let viewer = auth.map(|AuthCtxExtractor(a)| a.user_id);
    Ok(Json(state.trips.get_trip(trip_id, viewer).await?))
}

pub async fn update_trip(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<UpdateTripRequest>,
) -> Result<Json<TripView>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let trip = state
        .trips
        .update_trip(trip_id, auth.user_id, req.into_patch())
        .await?;
    Ok(Json(trip))
}

pub async fn delete_trip(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(trip_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.trips.delete_trip(trip_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
