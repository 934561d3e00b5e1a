/*
 * Responsibility
 * - Load config → build dependencies → assemble the Router
 * - Apply middleware (auth, rate limit, security headers, CORS, HTTP plumbing)
 * - Serve with axum::serve()
 */
use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, panic, process, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware::{auth::access, cors, http, rate_limit, security_headers},
    repos::{ItineraryStore, PgItineraryStore},
    services::{
        auth::AuthService,
        cache::{Cache, Invalidator, KvStore, LockManager, ValkeyStore},
        itinerary::{ActivityService, AdminService, StopService, TripService},
        rate_limit::RateLimiter,
    },
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins, e.g. RUST_LOG=info,globetrotter_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    // ConnectInfo feeds the rate limiter's fallback identifier
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("database migration failed")?;
    tracing::info!("database ready");

    let kv: Arc<dyn KvStore> = Arc::new(
        ValkeyStore::new(&config.redis_url, config.cache_op_timeout)
            .await
            .context("failed to connect to the cache store")?,
    );
    let cache = Cache::new(kv, config.cache_ttls);
    tracing::info!(?cache, "cache ready");

    let locks = LockManager::new(cache.clone());
    let invalidator = Invalidator::new(cache.clone());
    let store: Arc<dyn ItineraryStore> = Arc::new(PgItineraryStore::new(db));

    Ok(AppState {
        trips: Arc::new(TripService::new(
            Arc::clone(&store),
            cache.clone(),
            locks,
            invalidator.clone(),
        )),
        stops: Arc::new(StopService::new(
            Arc::clone(&store),
            cache.clone(),
            invalidator.clone(),
        )),
        activities: Arc::new(ActivityService::new(
            Arc::clone(&store),
            cache.clone(),
            invalidator,
        )),
        admin: Arc::new(AdminService::new(store, cache.clone())),
        auth: Arc::new(AuthService::new(
            &config.jwt_secret,
            config.auth_issuer.as_deref(),
            config.access_token_leeway_seconds,
        )),
        rate_limiter: Arc::new(RateLimiter::new(cache, config.rate_limit_per_minute)),
        trust_proxy: config.trust_proxy,
    })
}

fn build_router(state: AppState, config: &Config) -> Router {
    // Layer order: the last applied runs first. access must see the request
    // before rate_limit so limits are keyed by user when a token is present.
    let v1 = api::v1::routes();
    let v1 = rate_limit::apply(v1, state.clone());
    let v1 = access::apply(v1, state.clone());

    let router = Router::new().nest("/api/v1", v1).with_state(state);

    let router = security_headers::apply(router);
    let router = cors::apply(router, config);
    http::apply(router)
}
