//! Track catalog queries

use crate::{now_secs, rfc3339, StorageError};
use sqlx::{Row, SqlitePool};
use wavecast_core::types::{CreateTrack, Track, TrackId, Username};

type Result<T> = std::result::Result<T, StorageError>;

/// Register a newly uploaded track
pub async fn create(pool: &SqlitePool, track: &CreateTrack) -> Result<Track> {
    let created_at = now_secs();

    sqlx::query(
        "INSERT INTO tracks (id, title, owner, file_path, cover_path, plays, created_at)
         VALUES (?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(track.id.as_str())
    .bind(&track.title)
    .bind(track.owner.as_str())
    .bind(&track.file_path)
    .bind(track.cover_path.as_deref())
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(Track {
        id: track.id.clone(),
        title: track.title.clone(),
        owner: track.owner.clone(),
        file_path: track.file_path.clone(),
        cover_path: track.cover_path.clone(),
        plays: 0,
        created_at: rfc3339(created_at),
    })
}

/// Get a track by ID
pub async fn get(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(
        "SELECT id, title, owner, file_path, cover_path, plays, created_at
         FROM tracks WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| track_from_row(&r)))
}

/// List tracks, newest first, optionally filtered by a title/owner search
///
/// # Returns
///
/// Returns the requested page and the total number of matching tracks.
pub async fn get_all(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Track>, i64)> {
    let pattern = search.map(|q| format!("%{}%", q));

    let (rows, total_row) = match &pattern {
        Some(pattern) => {
            let rows = sqlx::query(
                "SELECT id, title, owner, file_path, cover_path, plays, created_at
                 FROM tracks
                 WHERE title LIKE ? OR owner LIKE ?
                 ORDER BY created_at DESC
                 LIMIT ? OFFSET ?",
            )
            .bind(pattern)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

            let total = sqlx::query(
                "SELECT COUNT(*) AS count FROM tracks WHERE title LIKE ? OR owner LIKE ?",
            )
            .bind(pattern)
            .bind(pattern)
            .fetch_one(pool)
            .await?;

            (rows, total)
        }
        None => {
            let rows = sqlx::query(
                "SELECT id, title, owner, file_path, cover_path, plays, created_at
                 FROM tracks
                 ORDER BY created_at DESC
                 LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

            let total = sqlx::query("SELECT COUNT(*) AS count FROM tracks")
                .fetch_one(pool)
                .await?;

            (rows, total)
        }
    };

    let tracks = rows.iter().map(track_from_row).collect();
    Ok((tracks, total_row.get("count")))
}

/// List tracks uploaded by one account, newest first
pub async fn by_owner(pool: &SqlitePool, owner: &Username) -> Result<Vec<Track>> {
    let rows = sqlx::query(
        "SELECT id, title, owner, file_path, cover_path, plays, created_at
         FROM tracks WHERE owner = ?
         ORDER BY created_at DESC",
    )
    .bind(owner.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(track_from_row).collect())
}

/// Delete a track row
///
/// Likes and comments go with it via `ON DELETE CASCADE`. Returns `false`
/// if no such track existed.
pub async fn delete(pool: &SqlitePool, id: &TrackId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Add one counted play and return the new total
///
/// Returns `None` if the track no longer exists. The increment and the read
/// are one statement, so concurrent plays never lose counts.
pub async fn increment_plays(pool: &SqlitePool, id: &TrackId) -> Result<Option<i64>> {
    let row = sqlx::query("UPDATE tracks SET plays = plays + 1 WHERE id = ? RETURNING plays")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("plays")))
}

fn track_from_row(row: &sqlx::sqlite::SqliteRow) -> Track {
    Track {
        id: TrackId::new(row.get::<String, _>("id")),
        title: row.get("title"),
        owner: Username::new(row.get::<String, _>("owner")),
        file_path: row.get("file_path"),
        cover_path: row.get("cover_path"),
        plays: row.get("plays"),
        created_at: rfc3339(row.get("created_at")),
    }
}
