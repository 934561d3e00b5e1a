use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::Pagination;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

/// `?page=&limit=`, normalized. Out-of-range numbers fall back to the
/// defaults; non-numeric values are a 400.
pub struct PageParams(pub Pagination);

impl FromRequestParts<AppState> for PageParams {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(q) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::validation("page and limit must be integers"))?;

        let page = q.page.and_then(|p| u32::try_from(p).ok());
        let limit = q.limit.and_then(|l| u32::try_from(l).ok());
        Ok(PageParams(Pagination::new(page, limit)))
    }
}
