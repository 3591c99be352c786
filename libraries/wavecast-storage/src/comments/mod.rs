//! Comment queries

use crate::{now_secs, rfc3339, StorageError};
use sqlx::{Row, SqlitePool};
use wavecast_core::types::{Comment, CommentId, CreateComment, TrackId, Username};

type Result<T> = std::result::Result<T, StorageError>;

/// Post a comment on a track
pub async fn create(pool: &SqlitePool, comment: &CreateComment) -> Result<Comment> {
    let id = CommentId::generate();
    let created_at = now_secs();

    sqlx::query(
        "INSERT INTO comments (id, track_id, author, body, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.as_str())
    .bind(comment.track_id.as_str())
    .bind(comment.author.as_str())
    .bind(&comment.body)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(Comment {
        id,
        track_id: comment.track_id.clone(),
        author: comment.author.clone(),
        body: comment.body.clone(),
        created_at: rfc3339(created_at),
    })
}

/// Comments on a track, oldest first
///
/// Ties on the second-resolution timestamp fall back to insertion order.
pub async fn list_for_track(pool: &SqlitePool, track_id: &TrackId) -> Result<Vec<Comment>> {
    let rows = sqlx::query(
        "SELECT id, track_id, author, body, created_at
         FROM comments WHERE track_id = ?
         ORDER BY created_at ASC, rowid ASC",
    )
    .bind(track_id.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(comment_from_row).collect())
}

/// Get a comment by ID
pub async fn find(pool: &SqlitePool, id: &CommentId) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, track_id, author, body, created_at
         FROM comments WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| comment_from_row(&r)))
}

/// Delete a comment
///
/// Returns `false` if no such comment existed.
pub async fn delete(pool: &SqlitePool, id: &CommentId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn comment_from_row(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: CommentId::new(row.get::<String, _>("id")),
        track_id: TrackId::new(row.get::<String, _>("track_id")),
        author: Username::new(row.get::<String, _>("author")),
        body: row.get("body"),
        created_at: rfc3339(row.get("created_at")),
    }
}
