/// Comment domain types
use crate::types::{CommentId, TrackId, Username};
use serde::{Deserialize, Serialize};

/// Comment left on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier
    pub id: CommentId,

    /// Track the comment belongs to
    pub track_id: TrackId,

    /// Account that wrote the comment
    pub author: Username,

    /// Comment text
    pub body: String,

    /// Creation timestamp (ISO string)
    pub created_at: String,
}

/// Data required to post a new comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    /// Track being commented on
    pub track_id: TrackId,

    /// Commenting account
    pub author: Username,

    /// Comment text
    pub body: String,
}
