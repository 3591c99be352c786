/// Authentication service tests
/// Tests password hashing, token minting, and the session flows
mod common;

use common::{create_test_database, fixtures};
use std::sync::Arc;
use wavecast_core::{CreateUser, CredentialStore, Username};
use wavecast_server::error::ServerError;
use wavecast_server::services::auth::{AuthService, TokenKind};
use wavecast_server::services::session::SessionManager;
use wavecast_storage::Database;

/// Test password hashing produces valid bcrypt hashes
#[tokio::test]
async fn test_password_hashing() {
    let auth_service = create_test_auth_service();

    let password = "MySecurePassword123!";
    let hash = auth_service.hash_password(password).unwrap();

    // Verify hash format (bcrypt starts with $2b$ or $2a$)
    assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$"));
    assert!(hash.len() > 50); // bcrypt hashes are typically 60 characters

    // Verify the hash is different each time (salt is random)
    let hash2 = auth_service.hash_password(password).unwrap();
    assert_ne!(hash, hash2, "Hashes should differ due to random salt");
}

/// Test password verification with correct and wrong passwords
#[tokio::test]
async fn test_password_verification() {
    let auth_service = create_test_auth_service();

    let password = "MySecurePassword123!";
    let hash = auth_service.hash_password(password).unwrap();

    assert!(auth_service.verify_password(password, &hash));
    assert!(!auth_service.verify_password("WrongPassword", &hash));
}

/// Test password verification with invalid hash format
#[tokio::test]
async fn test_password_verification_invalid_hash() {
    let auth_service = create_test_auth_service();

    // A corrupt digest is a failed match, never a panic or an error
    assert!(!auth_service.verify_password("password", "not-a-valid-hash"));
    assert!(!auth_service.verify_password("password", ""));
    assert!(!auth_service.verify_password("password", "$2b$12$short"));
}

/// Test token generation and decoding round-trips the claims
#[tokio::test]
async fn test_token_generation_and_decoding() {
    let auth_service = create_test_auth_service();
    let user = Username::new("user123");

    let token = auth_service.create_access_token(&user).unwrap();
    assert!(!token.is_empty(), "Token should not be empty");

    let claims = auth_service.decode(&token).unwrap();
    assert_eq!(claims.sub, "user123");
    assert_eq!(claims.kind, TokenKind::Access);

    let token = auth_service.create_refresh_token(&user).unwrap();
    let claims = auth_service.decode(&token).unwrap();
    assert_eq!(claims.sub, "user123");
    assert_eq!(claims.kind, TokenKind::Refresh);
}

/// Test that an access token cannot be used to refresh
#[tokio::test]
async fn test_refresh_rejects_access_tokens() {
    let (sessions, _db) = create_test_sessions().await;

    let pair = sessions
        .login(&Username::new(fixtures::TEST_USERNAME), fixtures::TEST_PASSWORD)
        .await
        .unwrap();

    let result = sessions.refresh(&pair.access_token);
    assert!(
        matches!(result, Err(ServerError::InvalidToken)),
        "Access token should not refresh"
    );
}

/// Test that a refresh token mints a working new pair
#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let (sessions, _db) = create_test_sessions().await;

    let pair = sessions
        .login(&Username::new(fixtures::TEST_USERNAME), fixtures::TEST_PASSWORD)
        .await
        .unwrap();

    let renewed = sessions.refresh(&pair.refresh_token).unwrap();
    let who = sessions
        .resolve_identity(&renewed.access_token)
        .await
        .unwrap();
    assert_eq!(who.as_str(), fixtures::TEST_USERNAME);
}

/// Test token validation with invalid signature
#[tokio::test]
async fn test_token_validation_invalid_signature() {
    let auth_service = create_test_auth_service();

    // Create a token with a different secret
    let other_auth = AuthService::new("different-secret".to_string(), 1, 1);
    let token = other_auth
        .create_access_token(&Username::new("user123"))
        .unwrap();

    let result = auth_service.decode(&token);
    assert!(
        matches!(result, Err(ServerError::InvalidToken)),
        "Token with wrong signature should fail validation"
    );
}

/// Test token validation with malformed and empty tokens
#[tokio::test]
async fn test_token_validation_malformed() {
    let auth_service = create_test_auth_service();

    assert!(auth_service.decode("not.a.valid.jwt.token").is_err());
    assert!(auth_service.decode("").is_err());
}

/// Test that expiry is reported as its own error
#[tokio::test]
async fn test_expired_token_reports_expiry() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use wavecast_server::services::auth::Claims;

    let auth_service = create_test_auth_service();

    // Sign already-expired claims with the same secret
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: "user123".to_string(),
        exp: (now - chrono::Duration::minutes(5)).timestamp(),
        iat: (now - chrono::Duration::minutes(35)).timestamp(),
        kind: TokenKind::Access,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret-key-for-testing"),
    )
    .unwrap();

    let result = auth_service.decode(&token);
    assert!(
        matches!(result, Err(ServerError::TokenExpired)),
        "Expired token should report TokenExpired, got {:?}",
        result
    );
}

/// Test complete authentication flow with database
#[tokio::test]
async fn test_complete_authentication_flow() {
    let (sessions, db) = create_test_sessions().await;
    let username = Username::new(fixtures::TEST_USERNAME);

    // Login mints a pair
    let pair = sessions
        .login(&username, fixtures::TEST_PASSWORD)
        .await
        .unwrap();

    // Access token resolves back to the account
    let who = sessions.resolve_identity(&pair.access_token).await.unwrap();
    assert_eq!(who, username);

    // The stored credential round-trips through the store trait
    let credential = db.find_credential(&username).await.unwrap().unwrap();
    assert!(credential.password_hash.starts_with("$2"));
}

/// Test authentication with wrong password
#[tokio::test]
async fn test_authentication_wrong_password() {
    let (sessions, _db) = create_test_sessions().await;

    let result = sessions
        .login(&Username::new(fixtures::TEST_USERNAME), "WrongPassword")
        .await;
    assert!(matches!(result, Err(ServerError::InvalidCredentials)));
}

/// Test authentication with non-existent user
#[tokio::test]
async fn test_authentication_nonexistent_user() {
    let (sessions, _db) = create_test_sessions().await;

    let result = sessions
        .login(&Username::new("nonexistent"), fixtures::TEST_PASSWORD)
        .await;
    assert!(
        matches!(result, Err(ServerError::InvalidCredentials)),
        "Missing account must look like a wrong password"
    );
}

/// Test that a token for a deleted account resolves to UnknownSubject
#[tokio::test]
async fn test_token_for_missing_account() {
    let (sessions, _db) = create_test_sessions().await;
    let auth_service = create_test_auth_service();

    let token = auth_service
        .create_access_token(&Username::new("ghost"))
        .unwrap();

    let result = sessions.resolve_identity(&token).await;
    assert!(matches!(result, Err(ServerError::UnknownSubject)));
}

/// Test multiple users with different passwords
#[tokio::test]
async fn test_multiple_users_authentication() {
    let db = create_test_database().await.unwrap();
    let auth_service = Arc::new(create_test_auth_service());

    for (username, password) in [
        (fixtures::TEST_USERNAME, fixtures::TEST_PASSWORD),
        (fixtures::OTHER_USERNAME, fixtures::OTHER_PASSWORD),
    ] {
        store_test_user(&db, &auth_service, username, password).await;
    }

    let sessions = SessionManager::new(
        Arc::clone(&auth_service),
        Arc::clone(&db) as Arc<dyn CredentialStore>,
    );

    // Each user authenticates only with their own password
    assert!(sessions
        .login(&Username::new(fixtures::TEST_USERNAME), fixtures::TEST_PASSWORD)
        .await
        .is_ok());
    assert!(sessions
        .login(&Username::new(fixtures::TEST_USERNAME), fixtures::OTHER_PASSWORD)
        .await
        .is_err());
    assert!(sessions
        .login(&Username::new(fixtures::OTHER_USERNAME), fixtures::OTHER_PASSWORD)
        .await
        .is_ok());
    assert!(sessions
        .login(&Username::new(fixtures::OTHER_USERNAME), fixtures::TEST_PASSWORD)
        .await
        .is_err());
}

// Helper functions

fn create_test_auth_service() -> AuthService {
    AuthService::new(
        "test-secret-key-for-testing".to_string(),
        30, // 30 minute access token
        7,  // 7 day refresh token
    )
}

async fn store_test_user(
    db: &Arc<Database>,
    auth_service: &AuthService,
    username: &str,
    password: &str,
) {
    let password_hash = auth_service.hash_password(password).unwrap();
    let created = db
        .create_user(&CreateUser {
            username: Username::new(username),
            email: None,
            display_name: None,
            password_hash,
        })
        .await
        .unwrap();
    assert!(created);
}

async fn create_test_sessions() -> (SessionManager, Arc<Database>) {
    let db = create_test_database().await.unwrap();
    let auth_service = Arc::new(create_test_auth_service());

    store_test_user(
        &db,
        &auth_service,
        fixtures::TEST_USERNAME,
        fixtures::TEST_PASSWORD,
    )
    .await;

    let sessions = SessionManager::new(
        auth_service,
        Arc::clone(&db) as Arc<dyn CredentialStore>,
    );
    (sessions, db)
}
