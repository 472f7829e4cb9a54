//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google sign-in and the lookup-or-create profile step
//! - Session token signing and validation
//! - Session materialization from the remote profile service
//! - CurrentSession extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod routes;
pub mod token;


pub use extractors::CurrentSession;
pub use routes::auth_routes;
