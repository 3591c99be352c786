/// Public media serving routes (covers and avatars)
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// GET /api/media/covers/:filename - Serve track cover art
pub async fn get_cover(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    serve_media(&state, &format!("covers/{}", filename)).await
}

/// GET /api/media/avatars/:filename - Serve a profile picture
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    serve_media(&state, &format!("avatars/{}", filename)).await
}

async fn serve_media(state: &AppState, relative: &str) -> Result<Response> {
    let path = state.media_store.resolve(relative)?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ServerError::NotFound(format!("Media not found: {}", relative)))?;
    let file_size = file.metadata().await?.len();

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    let body = Body::from_stream(ReaderStream::new(file));
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, file_size)
        .body(body)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(response)
}
