//! Integration tests for the users vertical slice
//!
//! Tests account operations including:
//! - Registration and the single-statement uniqueness guarantee
//! - Credential lookup for the authentication path
//! - Partial profile updates
//! - Aggregate statistics


use test_helpers::*;
use wavecast_core::types::{CreateUser, UpdateProfile, Username};
use wavecast_core::CredentialStore;

#[tokio::test]
async fn test_create_and_find_user() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let alice = create_test_user(db, "alice").await;

    let user = db
        .find_user(&alice)
        .await
        .expect("Failed to query user")
        .expect("User should exist");

    assert_eq!(user.username, alice);
    assert_eq!(user.email, Some("alice@example.com".to_string()));
    assert!(user.avatar_path.is_none());
    assert!(!user.created_at.is_empty());
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    create_test_user(db, "alice").await;

    let created = db
        .create_user(&CreateUser {
            username: Username::new("alice"),
            email: None,
            display_name: Some("Other Alice".to_string()),
            password_hash: "$2b$12$other-digest".to_string(),
        })
        .await
        .expect("Insert should not error on conflict");

    assert!(!created, "second registration must report a conflict");

    // The original row is untouched
    let credential = db
        .find_credential(&Username::new("alice"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credential.password_hash, "$2b$12$fixture-digest");
}

#[tokio::test]
async fn test_find_credential_for_missing_user() {
    let test_db = TestDb::new().await;

    let found = test_db
        .db
        .find_credential(&Username::new("nobody"))
        .await
        .expect("Lookup should not error");

    assert!(found.is_none());
}

#[tokio::test]
async fn test_partial_profile_update() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let alice = create_test_user(db, "alice").await;

    // Only the display name changes, the email survives
    let updated = db
        .update_profile(
            &alice,
            &UpdateProfile {
                email: None,
                display_name: Some("Alice A.".to_string()),
            },
        )
        .await
        .expect("Update should succeed")
        .expect("User should exist");

    assert_eq!(updated.display_name, Some("Alice A.".to_string()));
    assert_eq!(updated.email, Some("alice@example.com".to_string()));

    // Updating a missing account reports None
    let missing = db
        .update_profile(&Username::new("nobody"), &UpdateProfile::default())
        .await
        .expect("Update should not error");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_set_avatar() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let alice = create_test_user(db, "alice").await;
    db.set_avatar(&alice, "avatars/alice.png")
        .await
        .expect("Avatar update should succeed");

    let user = db.find_user(&alice).await.unwrap().unwrap();
    assert_eq!(user.avatar_path, Some("avatars/alice.png".to_string()));
}

#[tokio::test]
async fn test_user_stats_aggregation() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let alice = create_test_user(db, "alice").await;
    let bob = create_test_user(db, "bob").await;

    let first = create_test_track(db, "First", &alice).await;
    let second = create_test_track(db, "Second", &alice).await;

    // Two counted plays on the first track, one like each from bob
    db.increment_plays(&first.id).await.unwrap();
    db.increment_plays(&first.id).await.unwrap();
    db.add_like(&first.id, &bob).await.unwrap();
    db.add_like(&second.id, &bob).await.unwrap();

    let stats = db.user_stats(&alice).await.expect("Stats should succeed");
    assert_eq!(stats.track_count, 2);
    assert_eq!(stats.total_plays, 2);
    assert_eq!(stats.likes_received, 2);

    // An account with no uploads reports zeros, not an error
    let empty = db.user_stats(&bob).await.unwrap();
    assert_eq!(empty.track_count, 0);
    assert_eq!(empty.total_plays, 0);
    assert_eq!(empty.likes_received, 0);
}

#[tokio::test]
async fn test_get_all_users_ordered() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    create_test_user(db, "charlie").await;
    create_test_user(db, "alice").await;
    create_test_user(db, "bob").await;

    let users = db.get_all_users().await.expect("Listing should succeed");
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "charlie"]);
}
