// Application state shared across all modules

use std::sync::Arc;

use crate::common::config::AuthConfig;
use crate::services::{GoogleService, ProfileStore};

/// Read-only state built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthConfig>,
    pub profiles: Arc<dyn ProfileStore>,
    pub google_service: Arc<GoogleService>,
}

impl AppState {
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }
}
