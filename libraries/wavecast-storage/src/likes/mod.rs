//! Like bookkeeping queries

use crate::{now_secs, StorageError};
use sqlx::{Row, SqlitePool};
use wavecast_core::types::{Track, TrackId, Username};

type Result<T> = std::result::Result<T, StorageError>;

/// Record a like
///
/// Returns `false` if this user already liked the track. The primary key on
/// `(track_id, username)` makes the insert a no-op in that case, so there is
/// no separate existence check to race against.
pub async fn add(pool: &SqlitePool, track_id: &TrackId, username: &Username) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO likes (track_id, username, created_at)
         VALUES (?, ?, ?)
         ON CONFLICT(track_id, username) DO NOTHING",
    )
    .bind(track_id.as_str())
    .bind(username.as_str())
    .bind(now_secs())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a like
///
/// Returns `false` if there was no like to remove.
pub async fn remove(pool: &SqlitePool, track_id: &TrackId, username: &Username) -> Result<bool> {
    let result = sqlx::query("DELETE FROM likes WHERE track_id = ? AND username = ?")
        .bind(track_id.as_str())
        .bind(username.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Like count for a track, plus whether the viewer is among the likers
pub async fn state_for_viewer(
    pool: &SqlitePool,
    track_id: &TrackId,
    viewer: &Username,
) -> Result<(i64, bool)> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS like_count,
                COALESCE(MAX(CASE WHEN username = ? THEN 1 ELSE 0 END), 0) AS liked
         FROM likes WHERE track_id = ?",
    )
    .bind(viewer.as_str())
    .bind(track_id.as_str())
    .fetch_one(pool)
    .await?;

    Ok((row.get("like_count"), row.get::<i64, _>("liked") != 0))
}

/// Tracks the user has liked, most recently liked first
pub async fn liked_tracks(pool: &SqlitePool, username: &Username) -> Result<Vec<Track>> {
    let rows = sqlx::query(
        "SELECT t.id, t.title, t.owner, t.file_path, t.cover_path, t.plays, t.created_at
         FROM tracks t
         JOIN likes l ON l.track_id = t.id
         WHERE l.username = ?
         ORDER BY l.created_at DESC",
    )
    .bind(username.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| Track {
            id: TrackId::new(r.get::<String, _>("id")),
            title: r.get("title"),
            owner: Username::new(r.get::<String, _>("owner")),
            file_path: r.get("file_path"),
            cover_path: r.get("cover_path"),
            plays: r.get("plays"),
            created_at: crate::rfc3339(r.get("created_at")),
        })
        .collect())
}
