use axum::{Json, extract::State};

use crate::{
    api::v1::extractors::{AuthCtxExtractor, PageParams},
    error::AppError,
    models::{AdminStats, Page, TripView, User},
    state::AppState,
};

pub async fn stats(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<AdminStats>, AppError> {
    if !auth.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(Json(state.admin.stats().await?))
}

pub async fn users(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    PageParams(page): PageParams,
) -> Result<Json<Page<User>>, AppError> {
    if !auth.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(Json(state.admin.users(page).await?))
}

pub async fn trips(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    PageParams(page): PageParams,
) -> Result<Json<Page<TripView>>, AppError> {
    if !auth.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(Json(state.admin.trips(page).await?))
}
