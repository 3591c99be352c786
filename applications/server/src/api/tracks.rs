/// Track API routes
use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use wavecast_core::{CreateTrack, Track, TrackId, Username};
use wavecast_storage::Database;

use crate::error::{Result, ServerError};
use crate::middleware::AuthenticatedUser;
use crate::services::MediaStore;
use crate::state::AppState;

/// A track as the API presents it. The on-disk audio path stays
/// internal; clients reach the audio through the stream endpoint.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: TrackId,
    pub title: String,
    pub owner: Username,
    pub cover_path: Option<String>,
    pub plays: i64,
    pub likes: i64,
    pub liked_by_me: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct TracksResponse {
    pub tracks: Vec<TrackResponse>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: i64,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub q: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Attach the viewer-dependent like state to a track
pub(crate) async fn decorate(
    db: &Database,
    track: Track,
    viewer: &Username,
) -> Result<TrackResponse> {
    let (likes, liked_by_me) = db.like_state(&track.id, viewer).await?;
    Ok(TrackResponse {
        id: track.id,
        title: track.title,
        owner: track.owner,
        cover_path: track.cover_path,
        plays: track.plays,
        likes,
        liked_by_me,
        created_at: track.created_at,
    })
}

pub(crate) async fn decorate_all(
    db: &Database,
    tracks: Vec<Track>,
    viewer: &Username,
) -> Result<Vec<TrackResponse>> {
    let mut decorated = Vec::with_capacity(tracks.len());
    for track in tracks {
        decorated.push(decorate(db, track, viewer).await?);
    }
    Ok(decorated)
}

/// GET /api/tracks - List tracks with optional title/owner search
pub async fn list_tracks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TrackQuery>,
) -> Result<Json<TracksResponse>> {
    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    let (tracks, total) = state
        .db
        .list_tracks(query.q.as_deref(), limit, offset)
        .await?;
    let tracks = decorate_all(&state.db, tracks, user.username()).await?;

    Ok(Json(TracksResponse { tracks, total }))
}

/// POST /api/tracks - Upload a track (multipart: title, file, optional cover)
pub async fn upload_track(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<TrackResponse>)> {
    // The limiter is consulted before the body is parsed; a rejected
    // upload costs nothing and records nothing.
    if !state.upload_limiter.admit(&addr.ip().to_string()).await {
        tracing::warn!(client = %addr.ip(), "Upload rejected by rate limiter");
        return Err(ServerError::RateLimited);
    }

    let boundary = super::multipart_boundary(&headers)?;
    let stream = futures_util::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut title: Option<String> = None;
    let mut audio: Option<Bytes> = None;
    let mut cover: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(ToString::to_string);
        let filename = field.file_name().map(ToString::to_string);

        match name.as_deref() {
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Invalid title field: {}", e)))?;
                title = Some(text);
            }
            Some("file") => {
                let filename = filename.unwrap_or_default();
                if !MediaStore::is_allowed_audio(&filename) {
                    return Err(ServerError::BadRequest(
                        "Only .mp3 uploads are supported".to_string(),
                    ));
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Invalid file field: {}", e)))?;
                audio = Some(data);
            }
            Some("cover") => {
                let filename = filename.unwrap_or_default();
                let Some(ext) = MediaStore::extension_of(&filename) else {
                    return Err(ServerError::BadRequest(
                        "Cover must be a jpg, jpeg, or png file".to_string(),
                    ));
                };
                if !MediaStore::is_allowed_image(&filename) {
                    return Err(ServerError::BadRequest(
                        "Cover must be a jpg, jpeg, or png file".to_string(),
                    ));
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Invalid cover field: {}", e)))?;
                cover = Some((ext, data));
            }
            _ => {}
        }
    }

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Track title is required".to_string()))?;
    let audio =
        audio.ok_or_else(|| ServerError::BadRequest("Audio file is required".to_string()))?;

    // ID first so the media files can be named before the row exists
    let id = TrackId::generate();
    let file_path = state.media_store.store_audio(&id, &audio).await?;

    let cover_path = match cover {
        Some((ext, data)) => {
            let relative = state.media_store.store_cover(&id, &ext, &data).await?;
            Some(format!("/api/media/{}", relative))
        }
        None => None,
    };

    let track = state
        .db
        .create_track(&CreateTrack {
            id: id.clone(),
            title,
            owner: user.username().clone(),
            file_path,
            cover_path,
        })
        .await?;

    tracing::info!(track = %id, owner = %user.username(), "Track uploaded");

    let response = decorate(&state.db, track, user.username()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/tracks/liked - Tracks the caller has liked
pub async fn liked_tracks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<TrackResponse>>> {
    let tracks = state.db.liked_tracks(user.username()).await?;
    let tracks = decorate_all(&state.db, tracks, user.username()).await?;
    Ok(Json(tracks))
}

/// GET /api/tracks/:id - Get a single track
pub async fn get_track(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<TrackId>,
) -> Result<Json<TrackResponse>> {
    let track = state
        .db
        .find_track(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Track not found: {}", id)))?;

    let response = decorate(&state.db, track, user.username()).await?;
    Ok(Json(response))
}

/// DELETE /api/tracks/:id - Delete a track (uploader only)
pub async fn delete_track(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<TrackId>,
) -> Result<StatusCode> {
    let track = state
        .db
        .find_track(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Track not found: {}", id)))?;

    if &track.owner != user.username() {
        return Err(ServerError::Forbidden(
            "Only the uploader can delete a track".to_string(),
        ));
    }

    state.media_store.delete_track_files(&track).await;
    state.db.delete_track(&id).await?;

    tracing::info!(track = %id, owner = %user.username(), "Track deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tracks/:id/like - Like a track
pub async fn like_track(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<TrackId>,
) -> Result<Json<LikeResponse>> {
    if state.db.find_track(&id).await?.is_none() {
        return Err(ServerError::NotFound(format!("Track not found: {}", id)));
    }

    if !state.db.add_like(&id, user.username()).await? {
        return Err(ServerError::Conflict("Track already liked".to_string()));
    }

    let (likes, _) = state.db.like_state(&id, user.username()).await?;
    Ok(Json(LikeResponse { liked: true, likes }))
}

/// DELETE /api/tracks/:id/like - Remove a like
pub async fn unlike_track(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<TrackId>,
) -> Result<Json<LikeResponse>> {
    if !state.db.remove_like(&id, user.username()).await? {
        return Err(ServerError::NotFound("Like not found".to_string()));
    }

    let (likes, _) = state.db.like_state(&id, user.username()).await?;
    Ok(Json(LikeResponse {
        liked: false,
        likes,
    }))
}
