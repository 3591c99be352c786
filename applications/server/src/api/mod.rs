/// API route modules
pub mod auth;
pub mod comments;
pub mod health;
pub mod media;
pub mod stream;
pub mod tracks;
pub mod users;

use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, HeaderMap},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::error::{Result, ServerError};
use crate::middleware;
use crate::state::AppState;

/// Pull the multipart boundary out of a Content-Type header
pub(crate) fn multipart_boundary(headers: &HeaderMap) -> Result<String> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ServerError::BadRequest("Missing content type".to_string()))?;

    multer::parse_boundary(content_type)
        .map_err(|_| ServerError::BadRequest("Expected multipart/form-data".to_string()))
}

/// Build the full application router. Used by both `main` and the
/// integration tests so they cannot drift apart.
pub fn router(app_state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/media/covers/:filename", get(media::get_cover))
        .route("/media/avatars/:filename", get(media::get_avatar));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Profile
        .route("/users/me", get(users::me))
        .route("/users/me", put(users::update_me))
        .route("/users/me/avatar", post(users::upload_avatar))
        .route("/users/me/stats", get(users::my_stats))
        .route("/users/:username", get(users::get_profile))
        .route("/users/:username/tracks", get(users::user_tracks))
        .route("/users/:username/stats", get(users::user_stats))
        // Tracks
        .route("/tracks", get(tracks::list_tracks))
        .route("/tracks", post(tracks::upload_track))
        .route("/tracks/liked", get(tracks::liked_tracks))
        .route("/tracks/:id", get(tracks::get_track))
        .route("/tracks/:id", delete(tracks::delete_track))
        // Likes
        .route("/tracks/:id/like", post(tracks::like_track))
        .route("/tracks/:id/like", delete(tracks::unlike_track))
        // Comments
        .route("/tracks/:id/comments", get(comments::list_comments))
        .route("/tracks/:id/comments", post(comments::post_comment))
        .route(
            "/tracks/:id/comments/:comment_id",
            delete(comments::delete_comment),
        )
        // Streaming and play accounting
        .route("/stream/:track_id", get(stream::stream_track))
        .route("/tracks/:id/play-complete", post(stream::play_complete))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.sessions),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
