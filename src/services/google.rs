// src/services/google.rs
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::auth::models::Identity;
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("invalid or malformed id_token")]
    InvalidToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("token audience mismatch")]
    AudienceMismatch,

    #[error("token missing required field: {0}")]
    MissingField(&'static str),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Verifies Google ID tokens by handing them to Google's tokeninfo endpoint.
///
/// No OAuth code exchange happens here; the client obtains the ID token from
/// Google directly and this service only asks Google whether it is genuine.
#[derive(Debug, Clone)]
pub struct GoogleService {
    client: Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleService {
    pub fn new(client_id: impl Into<String>, tokeninfo_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            client_id: client_id.into(),
            tokeninfo_url: tokeninfo_url.into(),
        }
    }

    /// Verify an ID token and return the identity it asserts.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<Identity, GoogleError> {
        let url = format!(
            "{}?id_token={}",
            self.tokeninfo_url,
            urlencoding::encode(id_token)
        );

        debug!("Initiating Google token validation with tokeninfo endpoint");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!(
                error = %e,
                endpoint = %self.tokeninfo_url,
                "HTTP error contacting Google tokeninfo endpoint"
            );
            GoogleError::RequestFailed(e.to_string())
        })?;

        let status = response.status();
        debug!(http_status = %status, "Received response from Google tokeninfo endpoint");

        if !status.is_success() {
            warn!(http_status = %status, "Google tokeninfo rejected the token");
            return match status.as_u16() {
                400 | 401 => Err(GoogleError::InvalidToken),
                _ => Err(GoogleError::RequestFailed(format!("HTTP {}", status))),
            };
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| GoogleError::InvalidResponse(e.to_string()))?;

        self.identity_from_tokeninfo(&body)
    }

    fn identity_from_tokeninfo(&self, body: &Value) -> Result<Identity, GoogleError> {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);

        let aud = text("aud").ok_or(GoogleError::MissingField("aud"))?;
        if aud != self.client_id {
            warn!(
                token_audience = %aud,
                expected_client_id = %self.client_id,
                "Google token audience validation failed - rejecting token"
            );
            return Err(GoogleError::AudienceMismatch);
        }

        // tokeninfo encodes numbers and booleans as strings
        if let Some(exp) = body.get("exp").and_then(lenient_i64) {
            let current_time = Utc::now().timestamp();
            if exp < current_time {
                warn!(token_exp = exp, current_time = current_time, "Google token has expired");
                return Err(GoogleError::TokenExpired);
            }
        }

        let email = text("email").ok_or(GoogleError::MissingField("email"))?;

        if body.get("email_verified").and_then(lenient_bool) == Some(false) {
            warn!(email = %safe_email_log(&email), "Google token contains unverified email address");
        }

        Ok(Identity {
            name: text("name"),
            email: Some(email),
            image: text("picture"),
        })
    }
}

fn lenient_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn lenient_bool(value: &Value) -> Option<bool> {
    value
        .as_bool()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
