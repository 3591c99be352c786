/// Bearer-token authentication middleware
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::ServerError;
use crate::services::SessionManager;
use wavecast_core::Username;

/// The identity resolved from the request's bearer token. Handlers take
/// this as an extractor; it is only present on routes behind
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Username);

impl AuthenticatedUser {
    pub fn username(&self) -> &Username {
        &self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(ServerError::InvalidToken)
    }
}

/// Require a valid `Authorization: Bearer <token>` header and stash the
/// resolved identity in request extensions for handlers to extract.
pub async fn auth_middleware(
    State(sessions): State<Arc<SessionManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ServerError::InvalidToken)?;

    let username = sessions.resolve_identity(token).await.map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        e
    })?;

    request.extensions_mut().insert(AuthenticatedUser(username));
    Ok(next.run(request).await)
}
