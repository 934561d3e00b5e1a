/*
 * Responsibility
 * - Bearer token verification (HS256 JWT issued by the identity provider)
 * - Authorization (ownership, roles) stays in services/handlers
 */
pub mod access_jwt;

pub use access_jwt::AuthService;
