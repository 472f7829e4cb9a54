//! Authentication handlers

use axum::extract::{Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extractors::{restore_session, CurrentSession};
use super::models::{GoogleIdTokenPayload, Session, SessionClaims, SignInResponse};
use super::policy::{sign_in, SignInDecision};
use super::token::encode_session_token;
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::GoogleError;

/// POST /api/auth/google
/// Signs a user in with a Google ID token
///
/// # Request Body
/// ```json
/// {
///   "id_token": "<google id token>"
/// }
/// ```
///
/// # Response
/// ```json
/// {
///   "token": "<session token>",
///   "session": { "user": { ... }, "expires": "..." }
/// }
/// ```
pub async fn google_auth(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<SignInResponse>, ApiError> {
    info!("Received Google auth request");

    if payload.id_token.trim().is_empty() {
        return Err(ApiError::BadRequest("missing id_token".to_string()));
    }

    let identity = state
        .google_service
        .verify_id_token(&payload.id_token)
        .await
        .map_err(google_error_to_api)?;

    let email = identity.email.clone().unwrap_or_default();

    if sign_in(state.profiles.as_ref(), &identity).await == SignInDecision::Denied {
        warn!(email = %safe_email_log(&email), "Sign-in denied");
        return Err(ApiError::AccessDenied("AccessDenied".to_string()));
    }

    let claims = SessionClaims::from_identity(&identity);
    let token = encode_session_token(&claims, state.jwt_secret()).map_err(|e| {
        error!(error = %e, email = %safe_email_log(&email), "Session token encoding failed");
        ApiError::InternalServer("token error".to_string())
    })?;

    let session = restore_session(&state, &token)
        .await
        .ok_or_else(|| ApiError::InternalServer("token error".to_string()))?;

    info!(
        email = %safe_email_log(&email),
        provider = "google",
        "User sign-in successful"
    );

    Ok(Json(SignInResponse { token, session }))
}

/// GET /api/auth/session
/// Returns the current session, or an empty object when signed out
pub async fn session_handler(session: Option<CurrentSession>) -> Json<Value> {
    match session {
        Some(CurrentSession(session)) => Json(json!(session)),
        None => Json(json!({})),
    }
}

/// GET /api/me
/// Returns the current session; requires a valid session token
pub async fn me_handler(CurrentSession(session): CurrentSession) -> Json<Session> {
    Json(session)
}

/// POST /api/auth/signout
/// Sessions live entirely in the token, so sign-out is client-side token
/// removal; this endpoint confirms the request.
pub async fn signout_handler() -> Json<Value> {
    info!("User sign-out requested");
    Json(json!({
        "message": "Signed out"
    }))
}

/// GET /api/auth/providers
/// Lists the configured identity providers
pub async fn providers_handler() -> Json<Value> {
    Json(json!({
        "google": {
            "id": "google",
            "name": "Google",
            "type": "oauth",
            "signinUrl": "/api/auth/google",
        }
    }))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn google_error_to_api(e: GoogleError) -> ApiError {
    match &e {
        GoogleError::InvalidToken => {
            ApiError::Unauthorized("invalid or malformed id_token".to_string())
        }
        GoogleError::TokenExpired => ApiError::Unauthorized("token has expired".to_string()),
        GoogleError::AudienceMismatch => {
            ApiError::Unauthorized("token audience mismatch".to_string())
        }
        GoogleError::MissingField(field) => {
            ApiError::BadRequest(format!("token missing required field: {}", field))
        }
        GoogleError::RequestFailed(_) | GoogleError::InvalidResponse(_) => {
            error!(error = %e, "Google token validation service unavailable");
            ApiError::ServiceUnavailable("google token validation service unavailable".to_string())
        }
    }
}
