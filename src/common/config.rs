// Process configuration, read once at startup

use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001,http://localhost:5173";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Startup configuration for the auth service.
///
/// Built once by [`AuthConfig::from_env`] and carried inside `AppState`;
/// nothing reads the environment after this point.
#[derive(Clone)]
pub struct AuthConfig {
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_tokeninfo_url: String,
    pub jwt_secret: String,
    pub profile_api_url: String,
    pub profile_api_key: String,
    pub profile_api_timeout: Duration,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let jwt_secret = required("NEXTAUTH_SECRET")?;
        let profile_api_url = required("GRAFBASE_API_URL")?;
        let profile_api_key = required("GRAFBASE_API_KEY")?;

        let google_tokeninfo_url = lookup("GOOGLE_TOKENINFO_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOKENINFO_URL.to_string());

        let profile_api_timeout = match lookup("PROFILE_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "PROFILE_API_TIMEOUT_SECS",
                    reason: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(30),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            google_client_id,
            google_client_secret,
            google_tokeninfo_url,
            jwt_secret,
            profile_api_url,
            profile_api_key,
            profile_api_timeout,
            port,
            cors_origins,
        })
    }

    pub fn has_google_client_secret(&self) -> bool {
        !self.google_client_secret.is_empty()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("google_client_id", &self.google_client_id)
            .field("google_client_secret", &"<redacted>")
            .field("google_tokeninfo_url", &self.google_tokeninfo_url)
            .field("jwt_secret", &"<redacted>")
            .field("profile_api_url", &self.profile_api_url)
            .field("profile_api_key", &"<redacted>")
            .field("profile_api_timeout", &self.profile_api_timeout)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}
