//! Account management and authentication queries

use crate::{now_secs, rfc3339, StorageError};
use sqlx::{Row, SqlitePool};
use wavecast_core::types::{CreateUser, Credential, UpdateProfile, User, UserStats, Username};

type Result<T> = std::result::Result<T, StorageError>;

/// Create a new account
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `user` - Account data with the password already hashed
///
/// # Returns
///
/// Returns `true` if the account was created, `false` if the username is
/// already taken. The uniqueness check and the insert are one statement, so
/// two concurrent registrations cannot both succeed.
pub async fn create(pool: &SqlitePool, user: &CreateUser) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO users (username, email, display_name, password_hash, created_at)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(username) DO NOTHING",
    )
    .bind(user.username.as_str())
    .bind(user.email.as_deref())
    .bind(user.display_name.as_deref())
    .bind(&user.password_hash)
    .bind(now_secs())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Get an account's stored credential for authentication
///
/// Returns `None` if the account does not exist.
pub async fn find_credential(
    pool: &SqlitePool,
    username: &Username,
) -> Result<Option<Credential>> {
    let row = sqlx::query("SELECT username, password_hash FROM users WHERE username = ?")
        .bind(username.as_str())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Credential {
        username: Username::new(r.get::<String, _>("username")),
        password_hash: r.get("password_hash"),
    }))
}

/// Get an account's public profile
pub async fn find(pool: &SqlitePool, username: &Username) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT username, email, display_name, avatar_path, created_at
         FROM users WHERE username = ?",
    )
    .bind(username.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| user_from_row(&r)))
}

/// Update profile fields, leaving `None` fields untouched
///
/// Returns the updated profile, or `None` if the account does not exist.
pub async fn update_profile(
    pool: &SqlitePool,
    username: &Username,
    update: &UpdateProfile,
) -> Result<Option<User>> {
    let result = sqlx::query(
        "UPDATE users
         SET email = COALESCE(?, email),
             display_name = COALESCE(?, display_name)
         WHERE username = ?",
    )
    .bind(update.email.as_deref())
    .bind(update.display_name.as_deref())
    .bind(username.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find(pool, username).await
}

/// Record the avatar path for an account
pub async fn set_avatar(pool: &SqlitePool, username: &Username, avatar_path: &str) -> Result<()> {
    sqlx::query("UPDATE users SET avatar_path = ? WHERE username = ?")
        .bind(avatar_path)
        .bind(username.as_str())
        .execute(pool)
        .await?;

    Ok(())
}

/// Aggregate upload and listening statistics for an account
pub async fn stats(pool: &SqlitePool, username: &Username) -> Result<UserStats> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS track_count,
                COALESCE(SUM(plays), 0) AS total_plays,
                (SELECT COUNT(*) FROM likes l
                 JOIN tracks lt ON lt.id = l.track_id
                 WHERE lt.owner = ?) AS likes_received
         FROM tracks WHERE owner = ?",
    )
    .bind(username.as_str())
    .bind(username.as_str())
    .fetch_one(pool)
    .await?;

    Ok(UserStats {
        track_count: row.get("track_count"),
        total_plays: row.get("total_plays"),
        likes_received: row.get("likes_received"),
    })
}

/// Get all accounts, ordered by username
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        "SELECT username, email, display_name, avatar_path, created_at
         FROM users ORDER BY username",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(user_from_row).collect())
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        username: Username::new(row.get::<String, _>("username")),
        email: row.get("email"),
        display_name: row.get("display_name"),
        avatar_path: row.get("avatar_path"),
        created_at: rfc3339(row.get("created_at")),
    }
}
