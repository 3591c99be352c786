/// Authentication API routes
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use wavecast_core::{CreateUser, User, Username};

use crate::error::{Result, ServerError};
use crate::services::TokenPair;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// POST /api/auth/register - Create a new account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let username = Username::new(request.username.trim());
    if username.is_blank() {
        return Err(ServerError::BadRequest(
            "Username must not be empty".to_string(),
        ));
    }
    if request.password.is_empty() {
        return Err(ServerError::BadRequest(
            "Password must not be empty".to_string(),
        ));
    }

    let password_hash = state.auth_service.hash_password(&request.password)?;
    let created = state
        .db
        .create_user(&CreateUser {
            username: username.clone(),
            email: request.email,
            display_name: request.display_name,
            password_hash,
        })
        .await?;

    if !created {
        return Err(ServerError::Conflict("Username already taken".to_string()));
    }

    let user = state
        .db
        .find_user(&username)
        .await?
        .ok_or_else(|| ServerError::Internal("Account missing after creation".to_string()))?;

    tracing::info!(user = %username, "Registered new account");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/login - Exchange credentials for a token pair
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>> {
    let username = Username::new(&request.username);
    let pair = state.sessions.login(&username, &request.password).await?;

    tracing::info!(user = %username, "Login succeeded");
    Ok(Json(pair.into()))
}

/// POST /api/auth/refresh - Exchange a refresh token for a new pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>> {
    let pair = state.sessions.refresh(&request.refresh_token)?;
    Ok(Json(pair.into()))
}
