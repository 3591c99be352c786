//! Integration tests for the comments vertical slice


use test_helpers::*;
use wavecast_core::types::{CommentId, CreateComment};

#[tokio::test]
async fn test_post_and_list_comments() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let alice = create_test_user(db, "alice").await;
    let bob = create_test_user(db, "bob").await;
    let track = create_test_track(db, "Song", &alice).await;

    let first = db
        .add_comment(&CreateComment {
            track_id: track.id.clone(),
            author: bob.clone(),
            body: "great intro".to_string(),
        })
        .await
        .expect("Comment should be created");

    let second = db
        .add_comment(&CreateComment {
            track_id: track.id.clone(),
            author: alice.clone(),
            body: "thanks!".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(first.author, bob);
    assert_eq!(first.body, "great intro");
    assert_ne!(first.id, second.id);

    let comments = db.comments_for_track(&track.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    // Oldest first
    assert_eq!(comments[0].id, first.id);
    assert_eq!(comments[1].id, second.id);
}

#[tokio::test]
async fn test_find_and_delete_comment() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let alice = create_test_user(db, "alice").await;
    let track = create_test_track(db, "Song", &alice).await;

    let comment = db
        .add_comment(&CreateComment {
            track_id: track.id.clone(),
            author: alice.clone(),
            body: "first!".to_string(),
        })
        .await
        .unwrap();

    let found = db
        .find_comment(&comment.id)
        .await
        .unwrap()
        .expect("Comment should exist");
    assert_eq!(found.body, "first!");
    assert_eq!(found.track_id, track.id);

    assert!(db.delete_comment(&comment.id).await.unwrap());
    assert!(db.find_comment(&comment.id).await.unwrap().is_none());
    // Deleting again reports false
    assert!(!db.delete_comment(&comment.id).await.unwrap());

    let missing = db.find_comment(&CommentId::new("ghost")).await.unwrap();
    assert!(missing.is_none());
}
