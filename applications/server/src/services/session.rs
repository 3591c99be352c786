/// Login, identity resolution, and token refresh
use std::sync::Arc;

use wavecast_core::{CredentialStore, Username};

use crate::error::{Result, ServerError};
use crate::services::auth::{AuthService, TokenKind, TokenPair};

/// Ties the token layer to the credential store.
///
/// Tokens are stateless: nothing here persists a session, so a token
/// stays valid until it expires. Revocation is out of scope.
pub struct SessionManager {
    auth: Arc<AuthService>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionManager {
    pub fn new(auth: Arc<AuthService>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { auth, credentials }
    }

    /// Check a username/password pair and mint a token pair.
    ///
    /// An unknown account and a wrong password both come back as
    /// `InvalidCredentials` so login probes cannot enumerate users.
    pub async fn login(&self, username: &Username, password: &str) -> Result<TokenPair> {
        let credential = self
            .credentials
            .find_credential(username)
            .await?
            .ok_or(ServerError::InvalidCredentials)?;

        if !self.auth.verify_password(password, &credential.password_hash) {
            return Err(ServerError::InvalidCredentials);
        }

        self.auth.issue_pair(username)
    }

    /// Resolve a bearer token to the account it names.
    ///
    /// The token kind is not checked here; only the refresh endpoint
    /// discriminates kinds, so a refresh token also authenticates
    /// requests for as long as it lives.
    pub async fn resolve_identity(&self, token: &str) -> Result<Username> {
        let claims = self.auth.decode(token)?;
        let username = Username::new(&claims.sub);

        if self.credentials.find_credential(&username).await?.is_none() {
            return Err(ServerError::UnknownSubject);
        }

        Ok(username)
    }

    /// Exchange a refresh token for a new access/refresh pair.
    ///
    /// The subject is taken from the verified claims without touching
    /// the credential store; a deleted account keeps refreshing until
    /// its refresh token expires, at which point it can no longer log
    /// in.
    pub fn refresh(&self, token: &str) -> Result<TokenPair> {
        let claims = self.auth.decode(token)?;

        if claims.kind != TokenKind::Refresh {
            return Err(ServerError::InvalidToken);
        }

        self.auth.issue_pair(&Username::new(claims.sub))
    }
}
