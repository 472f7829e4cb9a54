//! Sign-in and session materialization against the profile service.
//!
//! Both entry points are stateless: every call talks to the profile store
//! afresh and nothing is shared between invocations.

use tracing::{debug, error, info, warn};

use super::models::{Identity, Session};
use crate::common::safe_email_log;
use crate::services::profile_api::{ProfileStore, UserProfile};

/// Outcome of a sign-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInDecision {
    Allowed,
    Denied,
}

impl SignInDecision {
    pub fn is_allowed(self) -> bool {
        self == SignInDecision::Allowed
    }
}

impl From<SignInDecision> for bool {
    fn from(decision: SignInDecision) -> Self {
        decision.is_allowed()
    }
}

/// Look up the identity's profile, creating it when none exists.
///
/// Any profile service failure denies the sign-in. The lookup and the
/// create are two separate calls, so two concurrent first logins with the
/// same email may both create.
pub async fn sign_in(store: &dyn ProfileStore, identity: &Identity) -> SignInDecision {
    let Some(email) = identity.email.as_deref() else {
        warn!("Sign-in denied: identity has no email");
        return SignInDecision::Denied;
    };

    let existing = match store.fetch_profile(email).await {
        Ok(profile) => profile,
        Err(e) => {
            error!(error = %e, email = %safe_email_log(email), "Profile lookup failed during sign-in");
            return SignInDecision::Denied;
        }
    };

    if existing.is_some() {
        debug!(email = %safe_email_log(email), "Existing profile found");
        return SignInDecision::Allowed;
    }

    let name = identity.name.as_deref().unwrap_or_default();
    let image = identity.image.as_deref().unwrap_or_default();

    match store.create_profile(name, email, image).await {
        Ok(profile) => {
            info!(
                profile_id = %profile.id,
                email = %safe_email_log(email),
                "Created profile for first sign-in"
            );
            SignInDecision::Allowed
        }
        Err(e) => {
            error!(error = %e, email = %safe_email_log(email), "Profile creation failed during sign-in");
            SignInDecision::Denied
        }
    }
}

/// Enrich a session with the remote profile for its email.
///
/// Never fails: when the profile is missing or the lookup errors, the
/// session comes back exactly as it went in.
pub async fn materialize_session(store: &dyn ProfileStore, session: Session) -> Session {
    let Some(email) = session.user.email.clone() else {
        debug!("Session has no email, skipping profile merge");
        return session;
    };

    match store.fetch_profile(&email).await {
        Ok(Some(profile)) => merge_profile(session, &profile),
        Ok(None) => {
            debug!(email = %safe_email_log(&email), "No profile for session email");
            session
        }
        Err(e) => {
            warn!(error = %e, email = %safe_email_log(&email), "Error retrieving user data");
            session
        }
    }
}

/// Overlay profile fields onto the session user. Profile values win.
pub fn merge_profile(session: Session, profile: &UserProfile) -> Session {
    Session {
        user: session.user.merged_with(profile),
        expires: session.expires,
    }
}
