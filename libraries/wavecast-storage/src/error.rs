/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether the underlying cause is the database being unreachable
    /// rather than a bad query or missing row
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Database(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

impl From<StorageError> for wavecast_core::WavecastError {
    fn from(err: StorageError) -> Self {
        if err.is_unavailable() {
            return wavecast_core::WavecastError::unavailable(err.to_string());
        }
        match err {
            StorageError::NotFound { entity, id } => {
                wavecast_core::WavecastError::NotFound { entity, id }
            }
            other => wavecast_core::WavecastError::storage(other.to_string()),
        }
    }
}
