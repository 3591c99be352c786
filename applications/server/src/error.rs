/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Login failed. Deliberately the same for a missing account and a
    /// wrong password, so the response does not reveal which usernames
    /// exist.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The presented token is malformed, has a bad signature, or is the
    /// wrong kind for the operation
    #[error("Invalid token")]
    InvalidToken,

    /// The presented token was once valid but its lifetime has passed
    #[error("Token expired")]
    TokenExpired,

    /// The token verified but names an account that no longer exists
    #[error("Unknown subject")]
    UnknownSubject,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many uploads, please wait before uploading again")]
    RateLimited,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A backing dependency (database, filesystem) is unreachable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<jsonwebtoken::errors::Error> for ServerError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServerError::TokenExpired,
            _ => ServerError::InvalidToken,
        }
    }
}

impl From<bcrypt::BcryptError> for ServerError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ServerError::Internal(format!("Password hashing failed: {}", err))
    }
}

impl From<wavecast_storage::StorageError> for ServerError {
    fn from(err: wavecast_storage::StorageError) -> Self {
        if err.is_unavailable() {
            return ServerError::Unavailable(err.to_string());
        }
        match err {
            wavecast_storage::StorageError::NotFound { entity, id } => {
                ServerError::NotFound(format!("{} not found: {}", entity, id))
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<wavecast_core::WavecastError> for ServerError {
    fn from(err: wavecast_core::WavecastError) -> Self {
        use wavecast_core::WavecastError;
        match err {
            WavecastError::NotFound { entity, id } => {
                ServerError::NotFound(format!("{} not found: {}", entity, id))
            }
            WavecastError::TrackNotFound(id) => {
                ServerError::NotFound(format!("Track not found: {}", id))
            }
            WavecastError::UserNotFound(name) => {
                ServerError::NotFound(format!("User not found: {}", name))
            }
            WavecastError::Duplicate(msg) => ServerError::Conflict(msg),
            WavecastError::InvalidInput(msg) => ServerError::BadRequest(msg),
            WavecastError::Unavailable(msg) => ServerError::Unavailable(msg),
            WavecastError::Io(err) => ServerError::Io(err),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::InvalidCredentials
            | ServerError::InvalidToken
            | ServerError::TokenExpired
            | ServerError::UnknownSubject => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ServerError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Unavailable(ref msg) => {
                tracing::error!("Dependency unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service unavailable".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
