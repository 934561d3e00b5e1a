//! Per-client request budget with `X-RateLimit-*` response headers.
//!
//! Identifier: authenticated user id, else the first `X-Forwarded-For` hop
//! (only with `TRUST_PROXY`, since clients can write that header), else the
//! peer address. Must sit inside the auth layer to see `AuthCtx`.

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::rate_limit::RateDecision;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let identifier = client_identifier(&req, state.trust_proxy);
    let decision = state.rate_limiter.check(&identifier).await;

    let mut res = if decision.allowed {
        next.run(req).await
    } else {
        tracing::info!(client = %identifier, "rate limit exceeded");
        AppError::TooManyRequests.into_response()
    };
    set_headers(res.headers_mut(), &decision);
    res
}

fn client_identifier(req: &Request<Body>, trust_proxy: bool) -> String {
    if let Some(ctx) = req.extensions().get::<AuthCtx>() {
        return ctx.user_id.to_string();
    }

    if trust_proxy {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn set_headers(headers: &mut HeaderMap, d: &RateDecision) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(d.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(d.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(d.reset));
}
