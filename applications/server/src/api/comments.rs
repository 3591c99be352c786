/// Comment API routes
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use wavecast_core::{Comment, CommentId, CreateComment, TrackId};

use crate::error::{Result, ServerError};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostCommentRequest {
    pub body: String,
}

/// GET /api/tracks/:id/comments - Comments on a track, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<TrackId>,
) -> Result<Json<Vec<Comment>>> {
    if state.db.find_track(&id).await?.is_none() {
        return Err(ServerError::NotFound(format!("Track not found: {}", id)));
    }

    let comments = state.db.comments_for_track(&id).await?;
    Ok(Json(comments))
}

/// POST /api/tracks/:id/comments - Comment on a track
pub async fn post_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<TrackId>,
    Json(request): Json<PostCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    if state.db.find_track(&id).await?.is_none() {
        return Err(ServerError::NotFound(format!("Track not found: {}", id)));
    }

    let body = request.body.trim().to_string();
    if body.is_empty() {
        return Err(ServerError::BadRequest(
            "Comment body must not be empty".to_string(),
        ));
    }

    let comment = state
        .db
        .add_comment(&CreateComment {
            track_id: id,
            author: user.username().clone(),
            body,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/tracks/:id/comments/:comment_id - Remove a comment.
/// Allowed for the comment's author and for the track's uploader.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, comment_id)): Path<(TrackId, CommentId)>,
) -> Result<StatusCode> {
    let comment = state
        .db
        .find_comment(&comment_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Comment not found: {}", comment_id)))?;

    if comment.track_id != id {
        return Err(ServerError::NotFound(format!(
            "Comment not found: {}",
            comment_id
        )));
    }

    let track = state
        .db
        .find_track(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Track not found: {}", id)))?;

    if &comment.author != user.username() && &track.owner != user.username() {
        return Err(ServerError::Forbidden(
            "Only the comment author or the track uploader can delete a comment".to_string(),
        ));
    }

    state.db.delete_comment(&comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
