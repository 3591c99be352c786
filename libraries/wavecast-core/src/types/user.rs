/// User domain types
use crate::types::Username;
use serde::{Deserialize, Serialize};

/// User account, as exposed to other users
///
/// The password digest lives in [`Credential`] and never leaves the
/// authentication path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique account name
    pub username: Username,

    /// Contact email, if provided at registration
    pub email: Option<String>,

    /// Name shown in the UI, falls back to the username
    pub display_name: Option<String>,

    /// Relative URL of the avatar image, if one was uploaded
    pub avatar_path: Option<String>,

    /// Account creation timestamp (ISO string)
    pub created_at: String,
}

/// Stored login material for one account
#[derive(Debug, Clone)]
pub struct Credential {
    /// Account the digest belongs to
    pub username: Username,

    /// Salted one-way password digest
    pub password_hash: String,
}

/// Data required to create a new account
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Chosen account name
    pub username: Username,

    /// Optional contact email
    pub email: Option<String>,

    /// Optional display name
    pub display_name: Option<String>,

    /// Pre-hashed password digest
    pub password_hash: String,
}

/// Partial profile update, `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    /// New contact email
    pub email: Option<String>,

    /// New display name
    pub display_name: Option<String>,
}

/// Aggregate listening statistics for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Number of tracks the account has uploaded
    pub track_count: i64,

    /// Sum of counted plays across those tracks
    pub total_plays: i64,

    /// Likes received across those tracks
    pub likes_received: i64,
}
