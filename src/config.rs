/*
 * Responsibility
 * - Load settings from the environment (DATABASE_URL, REDIS_URL, JWT, CORS, cache TTLs)
 * - Validate them (missing or malformed values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::cache::CacheTtls;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    pub auth_issuer: Option<String>,
    pub access_token_leeway_seconds: u64,

    pub cache_op_timeout: Duration,
    pub cache_ttls: CacheTtls,
    pub rate_limit_per_minute: u32,
    // Only behind a reverse proxy that overwrites X-Forwarded-For.
    pub trust_proxy: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print secrets or credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("auth_issuer", &self.auth_issuer)
            .field("cache_op_timeout", &self.cache_op_timeout)
            .field("cache_ttls", &self.cache_ttls)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("trust_proxy", &self.trust_proxy)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or(&get, "PORT", 3000)?;
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let redis_url = get("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".to_string());

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let auth_issuer = get("AUTH_ISSUER").filter(|s| !s.trim().is_empty());
        let access_token_leeway_seconds = parse_or(&get, "ACCESS_TOKEN_LEEWAY_SECONDS", 60)?;

        let cache_op_timeout = Duration::from_millis(parse_or(&get, "CACHE_OP_TIMEOUT_MS", 500)?);

        let defaults = CacheTtls::default();
        let secs = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            let v: u64 = parse_or(&get, key, default.as_secs())?;
            if v == 0 {
                return Err(ConfigError::Invalid(key));
            }
            Ok(Duration::from_secs(v))
        };
        let cache_ttls = CacheTtls {
            public_trips: secs("CACHE_TTL_PUBLIC_TRIPS", defaults.public_trips)?,
            public_trip: secs("CACHE_TTL_PUBLIC_TRIP", defaults.public_trip)?,
            user_trips: secs("CACHE_TTL_USER_TRIPS", defaults.user_trips)?,
            admin_stats: secs("CACHE_TTL_ADMIN_STATS", defaults.admin_stats)?,
            trip_stops: secs("CACHE_TTL_TRIP_STOPS", defaults.trip_stops)?,
            stop_activities: secs("CACHE_TTL_STOP_ACTIVITIES", defaults.stop_activities)?,
            lock: secs("CACHE_LOCK_TTL", defaults.lock)?,
            rate_limit_window: defaults.rate_limit_window,
        };

        let rate_limit_per_minute = parse_or(&get, "RATE_LIMIT_PER_MINUTE", 100)?;
        let trust_proxy = parse_or(&get, "TRUST_PROXY", false)?;

        Ok(Self {
            addr,
            database_url,
            redis_url,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            auth_issuer,
            access_token_leeway_seconds,
            cache_op_timeout,
            cache_ttls,
            rate_limit_per_minute,
            trust_proxy,
        })
    }
}

// Absent means default; present but unparsable is an error.
fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
    }
}
