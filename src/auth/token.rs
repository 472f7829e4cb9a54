//! Session token encoding and validation

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::SessionClaims;

/// Issuer tag embedded in every session token.
pub const TOKEN_ISSUER: &str = "grafbase";

/// Session token lifetime: 365 days.
pub const TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 365;

const RESERVED_CLAIMS: [&str; 3] = ["iss", "iat", "exp"];

/// Keys serialized from the declared `SessionClaims` fields.
const DECLARED_CLAIMS: [&str; 4] = ["sub", "name", "email", "picture"];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid session token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("session token expiry out of range: {0}")]
    ExpiryOutOfRange(i64),

    #[error("failed to sign session token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Full signed payload: the session claims plus issuer and validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedClaims {
    #[serde(flatten)]
    pub claims: SessionClaims,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl SignedClaims {
    /// `None` when `exp` is outside the representable date range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

impl SessionClaims {
    /// Drop `extra` entries that would collide with a declared or signing
    /// field once flattened into the payload. Declared fields win.
    pub fn normalized(&self) -> Self {
        let mut claims = self.clone();
        for key in RESERVED_CLAIMS.iter().chain(DECLARED_CLAIMS.iter()) {
            claims.extra.remove(*key);
        }
        claims
    }
}

/// Sign `claims` into a session token valid for one year from now.
pub fn encode_session_token(claims: &SessionClaims, secret: &str) -> Result<String, TokenError> {
    encode_session_token_at(claims, secret, Utc::now())
}

/// Sign `claims` as if issued at `issued_at`.
pub fn encode_session_token_at(
    claims: &SessionClaims,
    secret: &str,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let iat = issued_at.timestamp();
    let payload = SignedClaims {
        claims: claims.normalized(),
        iss: TOKEN_ISSUER.to_string(),
        iat,
        exp: iat + TOKEN_TTL_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Encode)
}

/// Verify signature and expiry.
///
/// The caller's claims are in `.claims`; `iss`, `iat` and `exp` are the
/// fields added at signing time. An `exp` that is not a representable date
/// is rejected rather than guessed.
pub fn decode_session_token(token: &str, secret: &str) -> Result<SignedClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;

    let signed = decode::<SignedClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(TokenError::Invalid)?;

    if signed.expires_at().is_none() {
        return Err(TokenError::ExpiryOutOfRange(signed.exp));
    }

    Ok(signed)
}
