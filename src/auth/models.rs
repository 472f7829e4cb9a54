//! Authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::profile_api::UserProfile;

/// User attributes handed over by the identity provider after login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// Claims carried inside a session token.
///
/// `sub`, `name`, `email` and `picture` are the provider fields; anything
/// else the token holds survives in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionClaims {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            sub: identity.email.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            picture: identity.image.clone(),
            extra: Map::new(),
        }
    }
}

/// The user part of a session: provider fields plus remote profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hub_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_in_url: Option<String>,
}

impl SessionUser {
    /// Overlay a remote profile onto this user; profile values win.
    pub fn merged_with(&self, profile: &UserProfile) -> Self {
        Self {
            name: Some(profile.name.clone()),
            email: Some(profile.email.clone()),
            image: self.image.clone(),
            id: Some(profile.id.clone()),
            avatar_url: Some(profile.avatar_url.clone()),
            description: profile.description.clone(),
            git_hub_url: profile.git_hub_url.clone(),
            linked_in_url: profile.linked_in_url.clone(),
        }
    }
}

/// Per-request session view. Rebuilt on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Build the provider-only session described by a decoded token.
    pub fn from_claims(claims: &SessionClaims, expires: DateTime<Utc>) -> Self {
        Self {
            user: SessionUser {
                name: claims.name.clone(),
                email: claims.email.clone(),
                image: claims.picture.clone(),
                ..SessionUser::default()
            },
            expires,
        }
    }
}

/// Google ID token payload for sign-in
#[derive(Debug, Deserialize)]
pub struct GoogleIdTokenPayload {
    pub id_token: String,
}

/// Response body for a successful sign-in
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub session: Session,
}
