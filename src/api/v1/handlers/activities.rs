use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::activities::{CreateActivityRequest, UpdateActivityRequest},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    models::ActivityView,
    state::AppState,
};

pub async fn list_stop_activities(
    State(state): State<AppState>,
    auth: Option<AuthCtxExtractor>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityView>>, AppError> {
    let viewer = auth.map(|AuthCtxExtractor(a)| a.user_id);
    Ok(Json(
        state
            .activities
            .list_stop_activities(stop_id, viewer)
            .await?,
    ))
}

pub async fn create_activity(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(stop_id): Path<Uuid>,
    Json(req): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityView>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let activity = state
        .activities
        .create_activity(auth.user_id, req.into_new_activity(stop_id))
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn get_activity(
    State(state): State<AppState>,
    auth: Option<AuthCtxExtractor>,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<ActivityView>, AppError> {
    let viewer = auth.map(|AuthCtxExtractor(a)| a.user_id);
    Ok(Json(state.activities.get_activity(activity_id, viewer).await?))
}

pub async fn update_activity(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(activity_id): Path<Uuid>,
    Json(req): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityView>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let activity = state
        .activities
        .update_activity(activity_id, auth.user_id, req.into_patch())
        .await?;
    Ok(Json(activity))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(activity_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .activities
        .delete_activity(activity_id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
