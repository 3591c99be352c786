//! Wavecast Server Library
//!
//! Multi-user audio sharing server with authentication, upload rate
//! limiting, and duration-gated play accounting.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::{
    auth::AuthService, media_store::MediaStore, play_tracker::PlayTracker,
    rate_limit::RateLimiter, session::SessionManager,
};
pub use state::AppState;
