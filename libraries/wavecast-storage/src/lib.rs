//! Wavecast Storage
//!
//! `SQLite` database layer for Wavecast.
//!
//! This crate provides persistent storage for accounts, tracks, likes, and
//! comments.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries and logic
//! - **Runtime Queries**: Plain `sqlx::query` calls, no compile-time schema
//! - **Narrow Traits**: Implements the `wavecast-core` storage traits so the
//!   access-control services never see `SQLite` directly
//!
//! # Example
//!
//! ```rust,no_run
//! use wavecast_storage::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Open (or create) the database and bring the schema up to date
//! let db = Database::new("sqlite://wavecast.db").await?;
//!
//! // List accounts
//! let users = db.get_all_users().await?;
//! # Ok(())
//! # }
//! ```

mod database;
mod error;

// Vertical slices
pub mod comments;
pub mod likes;
pub mod tracks;
pub mod users;

pub use database::Database;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://wavecast.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    // Parse the URL into options so we can configure SQLite behavior
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true) // Create database file if it doesn't exist
        .journal_mode(SqliteJournalMode::Wal) // Use WAL mode for better concurrency
        .foreign_keys(true) // Needed for ON DELETE CASCADE
        .busy_timeout(std::time::Duration::from_secs(30)); // Wait up to 30s for locks

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Render a stored unix timestamp as an RFC 3339 string
pub(crate) fn rfc3339(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Current unix timestamp for new rows
pub(crate) fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
