/// Track domain types
use crate::types::{TrackId, Username};
use serde::{Deserialize, Serialize};

/// Uploaded audio track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Account that uploaded the track
    pub owner: Username,

    /// Audio file path, relative to the media root
    pub file_path: String,

    /// Cover image path, relative to the media root
    pub cover_path: Option<String>,

    /// Counted plays (only listens that crossed the duration gate)
    pub plays: i64,

    /// Upload timestamp (ISO string)
    pub created_at: String,
}

/// Data required to register a new track
///
/// The ID is generated by the caller so the media files can be named after
/// it before the row exists.
#[derive(Debug, Clone)]
pub struct CreateTrack {
    /// Pre-generated track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Uploading account
    pub owner: Username,

    /// Audio file path, relative to the media root
    pub file_path: String,

    /// Cover image path, if a cover was uploaded
    pub cover_path: Option<String>,
}
