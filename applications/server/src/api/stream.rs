/// Audio streaming and play accounting API routes
use std::io::SeekFrom;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use wavecast_core::TrackId;

use crate::error::{Result, ServerError};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PlayCompleteResponse {
    pub counted: bool,
    pub plays: i64,
}

/// GET /api/stream/:track_id - Stream a track's audio.
///
/// Supports byte ranges for seeking. Starting a stream opens the play
/// gate for this (track, listener) pair; the play is only counted once
/// the client later reports completion.
pub async fn stream_track(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(track_id): Path<TrackId>,
    headers: HeaderMap,
) -> Result<Response> {
    let track = state
        .db
        .find_track(&track_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Track not found: {}", track_id)))?;

    let path = state.media_store.resolve(&track.file_path)?;
    let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
        tracing::error!(track = %track_id, "Audio file missing from media store: {}", e);
        ServerError::NotFound(format!("Audio not found for track: {}", track_id))
    })?;
    let file_size = file.metadata().await?.len();

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    state.play_tracker.mark_started(&track_id, user.username()).await;

    if let Some(range) = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| parse_range(value, file_size))
    {
        let (start, end) = range;
        let content_length = end - start + 1;

        file.seek(SeekFrom::Start(start)).await?;
        let reader = file.take(content_length);
        let body = Body::from_stream(ReaderStream::new(reader));

        let response = Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, mime.as_ref())
            .header(header::CONTENT_LENGTH, content_length)
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, file_size),
            )
            .header(header::ACCEPT_RANGES, "bytes")
            .body(body)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        return Ok(response);
    }

    let body = Body::from_stream(ReaderStream::new(file));
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, file_size)
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(response)
}

/// POST /api/tracks/:id/play-complete - Report the end of a listening
/// session. Responds with whether the play counted and the new total.
pub async fn play_complete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<TrackId>,
) -> Result<Json<PlayCompleteResponse>> {
    if state.db.find_track(&id).await?.is_none() {
        return Err(ServerError::NotFound(format!("Track not found: {}", id)));
    }

    let counted = state.play_tracker.mark_completed(&id, user.username()).await?;

    let track = state
        .db
        .find_track(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Track not found: {}", id)))?;

    Ok(Json(PlayCompleteResponse {
        counted,
        plays: track.plays,
    }))
}

/// Parse a `Range: bytes=start-end` header against a known file size.
/// Returns `None` for anything unsatisfiable; the caller then serves
/// the whole file.
fn parse_range(range: &str, file_size: u64) -> Option<(u64, u64)> {
    if file_size == 0 {
        return None;
    }

    let range = range.strip_prefix("bytes=")?;
    let mut parts = range.splitn(2, '-');
    let start_str = parts.next()?;
    let end_str = parts.next()?;

    if start_str.is_empty() {
        // Suffix form: the last N bytes
        let suffix: u64 = end_str.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        return Some((file_size.saturating_sub(suffix), file_size - 1));
    }

    let start: u64 = start_str.parse().ok()?;
    let end: u64 = if end_str.is_empty() {
        file_size - 1
    } else {
        end_str.parse().ok()?
    };
    let end = end.min(file_size - 1);

    if start > end || start >= file_size {
        return None;
    }
    Some((start, end))
}
