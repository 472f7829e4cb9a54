//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/google` - Sign in with a Google ID token
/// - `GET /api/auth/session` - Current session, or `{}` when signed out
/// - `POST /api/auth/signout` - Sign out (client-side token removal)
/// - `GET /api/auth/providers` - Configured identity providers
/// - `GET /api/me` - Current session, `401` when signed out
/// - `GET /health` - Liveness probe
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/google", post(handlers::google_auth))
        .route("/api/auth/session", get(handlers::session_handler))
        .route("/api/auth/signout", post(handlers::signout_handler))
        .route("/api/auth/providers", get(handlers::providers_handler))
        .route("/api/me", get(handlers::me_handler))
        .route("/health", get(handlers::health_handler))
}
