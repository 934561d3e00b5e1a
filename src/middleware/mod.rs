/*
 * Responsibility
 * - Router-level middleware, each exposed as an `apply(...)` function
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod rate_limit;
pub mod security_headers;
