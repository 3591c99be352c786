/// Core error types for Wavecast
use crate::types::{TrackId, Username};
use thiserror::Error;

/// Result type alias using `WavecastError`
pub type Result<T> = std::result::Result<T, WavecastError>;

/// Core error type for Wavecast
#[derive(Error, Debug)]
pub enum WavecastError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Track not found
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(Username),

    /// Duplicate entry
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backing store unreachable or unhealthy
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl WavecastError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a duplicate entry error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
