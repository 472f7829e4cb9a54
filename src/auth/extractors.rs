//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::Session;
use super::policy::materialize_session;
use super::token::decode_session_token;
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

/// Cookie name used by browser clients to carry the session token.
pub const SESSION_COOKIE: &str = "next-auth.session-token";

/// Session restored from the request's token and enriched with the
/// caller's remote profile.
///
/// Rejects with `401` when no valid token is present. Wrap in `Option` for
/// routes where being signed out is not an error.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match session_token_from_headers(&parts.headers) {
            Some(t) => t,
            None => {
                debug!("No session token on request");
                return Err(ApiError::Unauthorized("not signed in".into()));
            }
        };

        match restore_session(&app_state, &token).await {
            Some(session) => Ok(CurrentSession(session)),
            None => Err(ApiError::Unauthorized("not signed in".into())),
        }
    }
}

/// Decode `token` and materialize the session it describes.
///
/// Returns `None` when the token does not verify or has expired.
pub async fn restore_session(state: &AppState, token: &str) -> Option<Session> {
    let signed = match decode_session_token(token, state.jwt_secret()) {
        Ok(signed) => signed,
        Err(e) => {
            warn!(error = %e, token = %safe_token_log(token), "Session token validation failed");
            return None;
        }
    };

    let Some(expires) = signed.expires_at() else {
        warn!(exp = signed.exp, "Session token expiry out of range");
        return None;
    };

    let session = Session::from_claims(&signed.claims, expires);
    let session = materialize_session(state.profiles.as_ref(), session).await;

    debug!(
        email = %session.user.email.as_deref().map(safe_email_log).unwrap_or_default(),
        has_profile = session.user.id.is_some(),
        "Session restored"
    );

    Some(session)
}

/// Pull the session token from `Authorization: Bearer` or the session cookie.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    // Other schemes (e.g. Basic from a proxy) fall through to the cookie
    if let Some(bare) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|bare| !bare.is_empty())
    {
        return Some(bare.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
