/// Business logic services
pub mod auth;
pub mod media_store;
pub mod play_tracker;
pub mod rate_limit;
pub mod session;

pub use auth::{AuthService, Claims, TokenKind, TokenPair};
pub use media_store::MediaStore;
pub use play_tracker::PlayTracker;
pub use rate_limit::RateLimiter;
pub use session::SessionManager;
