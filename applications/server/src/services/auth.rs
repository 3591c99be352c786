/// Password hashing and token minting
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use wavecast_core::Username;

use crate::error::Result;

/// Discriminates the two token roles. An access token authenticates
/// requests; a refresh token may only be exchanged for a new pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every signed token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    /// Expiration (unix timestamp)
    pub exp: i64,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Access or refresh
    pub kind: TokenKind,
}

/// Access and refresh tokens issued together at login and on refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies tokens, hashes and checks passwords
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
    refresh_token_expiration: Duration,
}

impl AuthService {
    pub fn new(secret: impl Into<String>, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiration: Duration::minutes(access_ttl_minutes),
            refresh_token_expiration: Duration::days(refresh_ttl_days),
        }
    }

    /// Hash a password for storage
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        Ok(hashed)
    }

    /// Check a password against a stored digest.
    ///
    /// A malformed or truncated digest counts as a failed match rather
    /// than an error, so a corrupt row can never let a login through.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Issue a fresh access/refresh pair for a user
    pub fn issue_pair(&self, username: &Username) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.create_access_token(username)?,
            refresh_token: self.create_refresh_token(username)?,
        })
    }

    pub fn create_access_token(&self, username: &Username) -> Result<String> {
        self.create_token(username, TokenKind::Access, self.access_token_expiration)
    }

    pub fn create_refresh_token(&self, username: &Username) -> Result<String> {
        self.create_token(username, TokenKind::Refresh, self.refresh_token_expiration)
    }

    fn create_token(
        &self,
        username: &Username,
        kind: TokenKind,
        expiration: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.as_str().to_string(),
            exp: (now + expiration).timestamp(),
            iat: now.timestamp(),
            kind,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify a token's signature and expiry and return its claims
    pub fn decode(&self, token: &str) -> Result<Claims> {
        // The default validation allows 60 seconds of clock leeway,
        // which would keep just-expired tokens alive. Expiry is exact.
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;

    fn service() -> AuthService {
        AuthService::new("test-secret-key", 30, 7)
    }

    #[test]
    fn password_hashing_roundtrip() {
        let auth = service();
        let hash = auth.hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$"));
        assert!(auth.verify_password("hunter2", &hash));
        assert!(!auth.verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_digest_is_a_failed_match() {
        let auth = service();
        assert!(!auth.verify_password("hunter2", "not-a-bcrypt-digest"));
        assert!(!auth.verify_password("hunter2", ""));
        assert!(!auth.verify_password("hunter2", "$2b$12$truncated"));
    }

    #[test]
    fn token_roundtrip_preserves_claims() {
        let auth = service();
        let user = Username::new("alice");

        let token = auth.create_access_token(&user).unwrap();
        let claims = auth.decode(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.kind, TokenKind::Access);
        assert!(claims.exp > claims.iat);

        let token = auth.create_refresh_token(&user).unwrap();
        let claims = auth.decode(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn pair_carries_both_kinds() {
        let auth = service();
        let pair = auth.issue_pair(&Username::new("bob")).unwrap();
        assert_eq!(auth.decode(&pair.access_token).unwrap().kind, TokenKind::Access);
        assert_eq!(
            auth.decode(&pair.refresh_token).unwrap().kind,
            TokenKind::Refresh
        );
    }

    #[test]
    fn wrong_secret_rejected() {
        let auth = service();
        let other = AuthService::new("different-secret", 30, 7);
        let token = auth.create_access_token(&Username::new("alice")).unwrap();
        assert!(matches!(
            other.decode(&token),
            Err(ServerError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_tokens_rejected() {
        let auth = service();
        assert!(matches!(
            auth.decode("not.a.token"),
            Err(ServerError::InvalidToken)
        ));
        assert!(matches!(auth.decode(""), Err(ServerError::InvalidToken)));
    }

    #[test]
    fn expired_token_reports_expiry() {
        let auth = service();
        // Sign claims that expired a minute ago with the same secret
        let now = Utc::now();
        let claims = Claims {
            sub: "alice".to_string(),
            exp: (now - Duration::minutes(1)).timestamp(),
            iat: (now - Duration::minutes(31)).timestamp(),
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(auth.decode(&token), Err(ServerError::TokenExpired)));
    }
}
