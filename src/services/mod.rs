// src/services/mod.rs
//
// Clients for the external services the auth flow talks to

pub mod google;
pub mod profile_api;

// Re-export commonly used types for convenience
pub use google::{GoogleError, GoogleService};
pub use profile_api::{GraphqlProfileClient, ProfileStore};
