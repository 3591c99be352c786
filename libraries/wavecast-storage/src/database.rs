//! Database facade over the vertical slices

use crate::{comments, likes, run_migrations, tracks, users, StorageError};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use wavecast_core::storage::{CredentialStore, PlayStore};
use wavecast_core::types::{
    Comment, CommentId, CreateComment, CreateTrack, CreateUser, Credential, Track, TrackId,
    UpdateProfile, User, UserStats, Username,
};
use wavecast_core::WavecastError;

type Result<T> = std::result::Result<T, StorageError>;

/// Open database with the schema applied
///
/// Owns the connection pool and exposes one method per query. The
/// access-control services reach it through the `wavecast-core` storage
/// traits instead, so they can be tested against stubs.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `database_url` and run migrations
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = crate::create_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database with the schema applied
    ///
    /// The pool is capped at a single connection: every `SQLite` in-memory
    /// database is scoped to its connection, so a wider pool would hand out
    /// empty databases.
    pub async fn in_memory() -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Create an account, returns `false` if the username is taken
    pub async fn create_user(&self, user: &CreateUser) -> Result<bool> {
        users::create(&self.pool, user).await
    }

    /// Get an account's public profile
    pub async fn find_user(&self, username: &Username) -> Result<Option<User>> {
        users::find(&self.pool, username).await
    }

    /// Update profile fields, `None` fields are left untouched
    pub async fn update_profile(
        &self,
        username: &Username,
        update: &UpdateProfile,
    ) -> Result<Option<User>> {
        users::update_profile(&self.pool, username, update).await
    }

    /// Record the avatar path for an account
    pub async fn set_avatar(&self, username: &Username, avatar_path: &str) -> Result<()> {
        users::set_avatar(&self.pool, username, avatar_path).await
    }

    /// Aggregate statistics for an account
    pub async fn user_stats(&self, username: &Username) -> Result<UserStats> {
        users::stats(&self.pool, username).await
    }

    /// Get all accounts
    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        users::get_all(&self.pool).await
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    /// Register a newly uploaded track
    pub async fn create_track(&self, track: &CreateTrack) -> Result<Track> {
        tracks::create(&self.pool, track).await
    }

    /// Get a track by ID
    pub async fn find_track(&self, id: &TrackId) -> Result<Option<Track>> {
        tracks::get(&self.pool, id).await
    }

    /// List tracks with optional search, returns the page and the total
    pub async fn list_tracks(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Track>, i64)> {
        tracks::get_all(&self.pool, search, limit, offset).await
    }

    /// Tracks uploaded by one account
    pub async fn tracks_by_owner(&self, owner: &Username) -> Result<Vec<Track>> {
        tracks::by_owner(&self.pool, owner).await
    }

    /// Delete a track row with its likes and comments
    pub async fn delete_track(&self, id: &TrackId) -> Result<bool> {
        tracks::delete(&self.pool, id).await
    }

    /// Add one counted play, returns the new total or `None` if the track
    /// no longer exists
    pub async fn increment_plays(&self, id: &TrackId) -> Result<Option<i64>> {
        tracks::increment_plays(&self.pool, id).await
    }

    // ========================================================================
    // Likes
    // ========================================================================

    /// Record a like, returns `false` if already liked
    pub async fn add_like(&self, track_id: &TrackId, username: &Username) -> Result<bool> {
        likes::add(&self.pool, track_id, username).await
    }

    /// Remove a like, returns `false` if there was none
    pub async fn remove_like(&self, track_id: &TrackId, username: &Username) -> Result<bool> {
        likes::remove(&self.pool, track_id, username).await
    }

    /// Like count plus whether the viewer liked the track
    pub async fn like_state(&self, track_id: &TrackId, viewer: &Username) -> Result<(i64, bool)> {
        likes::state_for_viewer(&self.pool, track_id, viewer).await
    }

    /// Tracks the user has liked
    pub async fn liked_tracks(&self, username: &Username) -> Result<Vec<Track>> {
        likes::liked_tracks(&self.pool, username).await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Post a comment on a track
    pub async fn add_comment(&self, comment: &CreateComment) -> Result<Comment> {
        comments::create(&self.pool, comment).await
    }

    /// Comments on a track, oldest first
    pub async fn comments_for_track(&self, track_id: &TrackId) -> Result<Vec<Comment>> {
        comments::list_for_track(&self.pool, track_id).await
    }

    /// Get a comment by ID
    pub async fn find_comment(&self, id: &CommentId) -> Result<Option<Comment>> {
        comments::find(&self.pool, id).await
    }

    /// Delete a comment, returns `false` if it did not exist
    pub async fn delete_comment(&self, id: &CommentId) -> Result<bool> {
        comments::delete(&self.pool, id).await
    }
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_credential(
        &self,
        username: &Username,
    ) -> wavecast_core::Result<Option<Credential>> {
        Ok(users::find_credential(&self.pool, username).await?)
    }
}

#[async_trait]
impl PlayStore for Database {
    async fn increment_play_count(&self, track_id: &TrackId) -> wavecast_core::Result<i64> {
        tracks::increment_plays(&self.pool, track_id)
            .await?
            .ok_or_else(|| WavecastError::TrackNotFound(track_id.clone()))
    }
}
