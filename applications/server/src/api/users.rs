/// User profile API routes
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use wavecast_core::{UpdateProfile, User, UserStats, Username};

use crate::api::tracks::{decorate_all, TrackResponse};
use crate::error::{Result, ServerError};
use crate::middleware::AuthenticatedUser;
use crate::services::MediaStore;
use crate::state::AppState;

/// GET /api/users/me - The caller's own profile
pub async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> Result<Json<User>> {
    let profile = state
        .db
        .find_user(user.username())
        .await?
        .ok_or(ServerError::UnknownSubject)?;
    Ok(Json(profile))
}

/// PUT /api/users/me - Update profile fields; omitted fields are kept
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(update): Json<UpdateProfile>,
) -> Result<Json<User>> {
    let profile = state
        .db
        .update_profile(user.username(), &update)
        .await?
        .ok_or(ServerError::UnknownSubject)?;

    tracing::info!(user = %user.username(), "Profile updated");
    Ok(Json(profile))
}

/// POST /api/users/me/avatar - Upload a profile picture (multipart: file)
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<User>> {
    let boundary = super::multipart_boundary(&headers)?;
    let stream = futures_util::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut avatar: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(ToString::to_string);
        let filename = field.file_name().map(ToString::to_string);

        if name.as_deref() == Some("file") {
            let filename = filename.unwrap_or_default();
            if !MediaStore::is_allowed_image(&filename) {
                return Err(ServerError::BadRequest(
                    "Avatar must be a jpg, jpeg, or png file".to_string(),
                ));
            }
            let Some(ext) = MediaStore::extension_of(&filename) else {
                return Err(ServerError::BadRequest(
                    "Avatar must be a jpg, jpeg, or png file".to_string(),
                ));
            };
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Invalid file field: {}", e)))?;
            avatar = Some((ext, data));
        }
    }

    let (ext, data) =
        avatar.ok_or_else(|| ServerError::BadRequest("Avatar file is required".to_string()))?;

    let relative = state
        .media_store
        .store_avatar(user.username(), &ext, &data)
        .await?;
    let public_path = format!("/api/media/{}", relative);
    state.db.set_avatar(user.username(), &public_path).await?;

    let profile = state
        .db
        .find_user(user.username())
        .await?
        .ok_or(ServerError::UnknownSubject)?;

    tracing::info!(user = %user.username(), "Avatar updated");
    Ok(Json(profile))
}

/// GET /api/users/me/stats - The caller's aggregate statistics
pub async fn my_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserStats>> {
    let stats = state.db.user_stats(user.username()).await?;
    Ok(Json(stats))
}

/// GET /api/users/:username - A public profile
pub async fn get_profile(
    State(state): State<AppState>,
    _viewer: AuthenticatedUser,
    Path(username): Path<Username>,
) -> Result<Json<User>> {
    let profile = state
        .db
        .find_user(&username)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("User not found: {}", username)))?;
    Ok(Json(profile))
}

/// GET /api/users/:username/tracks - Tracks uploaded by a user
pub async fn user_tracks(
    State(state): State<AppState>,
    viewer: AuthenticatedUser,
    Path(username): Path<Username>,
) -> Result<Json<Vec<TrackResponse>>> {
    if state.db.find_user(&username).await?.is_none() {
        return Err(ServerError::NotFound(format!(
            "User not found: {}",
            username
        )));
    }

    let tracks = state.db.tracks_by_owner(&username).await?;
    let tracks = decorate_all(&state.db, tracks, viewer.username()).await?;
    Ok(Json(tracks))
}

/// GET /api/users/:username/stats - Aggregate statistics for a user
pub async fn user_stats(
    State(state): State<AppState>,
    _viewer: AuthenticatedUser,
    Path(username): Path<Username>,
) -> Result<Json<UserStats>> {
    if state.db.find_user(&username).await?.is_none() {
        return Err(ServerError::NotFound(format!(
            "User not found: {}",
            username
        )));
    }

    let stats = state.db.user_stats(&username).await?;
    Ok(Json(stats))
}
