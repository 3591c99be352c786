/// Shared application state
use std::sync::Arc;

use wavecast_storage::Database;

use crate::services::{AuthService, MediaStore, PlayTracker, RateLimiter, SessionManager};

/// Everything the request handlers need, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub sessions: Arc<SessionManager>,
    pub media_store: Arc<MediaStore>,
    pub upload_limiter: Arc<RateLimiter>,
    pub play_tracker: Arc<PlayTracker>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        auth_service: Arc<AuthService>,
        sessions: Arc<SessionManager>,
        media_store: Arc<MediaStore>,
        upload_limiter: Arc<RateLimiter>,
        play_tracker: Arc<PlayTracker>,
    ) -> Self {
        Self {
            db,
            auth_service,
            sessions,
            media_store,
            upload_limiter,
            play_tracker,
        }
    }
}
