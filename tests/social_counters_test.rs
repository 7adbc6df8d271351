// ABOUTME: Tests for the social graph and denormalized counter maintenance
// ABOUTME: Likes, comments, follows; counters recounted inside each mutation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Utc;
use common::{create_test_database, create_test_user};
use stride_server::errors::ErrorCode;
use stride_server::models::{FollowRequestStatus, NotificationType, Post};
use uuid::Uuid;

async fn create_test_post(db: &stride_server::database::Database, user_id: Uuid) -> Post {
    let now = Utc::now();
    let post = Post {
        id: Uuid::new_v4(),
        user_id,
        content: "Crushed leg day".into(),
        created_at: now,
        updated_at: now,
        likes_count: 0,
        comments_count: 0,
    };
    db.create_post(&post).await.expect("Failed to create post");
    post
}

#[tokio::test]
async fn like_then_unlike_nets_to_zero() {
    let db = create_test_database().await;
    let author = create_test_user(&db, "author").await;
    let fan = create_test_user(&db, "fan").await;
    let post = create_test_post(&db, author.id).await;

    db.like_post(fan.id, post.id)
        .await
        .expect("Failed to like post");
    let liked = db
        .get_post_required(post.id)
        .await
        .expect("Failed to get post");
    assert_eq!(liked.likes_count, 1);

    db.unlike_post(fan.id, post.id)
        .await
        .expect("Failed to unlike post");
    let unliked = db
        .get_post_required(post.id)
        .await
        .expect("Failed to get post");
    assert_eq!(unliked.likes_count, post.likes_count);
}

#[tokio::test]
async fn double_like_is_rejected() {
    let db = create_test_database().await;
    let author = create_test_user(&db, "double_author").await;
    let fan = create_test_user(&db, "double_fan").await;
    let post = create_test_post(&db, author.id).await;

    db.like_post(fan.id, post.id)
        .await
        .expect("Failed to like post");
    let err = db
        .like_post(fan.id, post.id)
        .await
        .expect_err("Second like must be rejected");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // The failed attempt left the counter alone
    let stored = db
        .get_post_required(post.id)
        .await
        .expect("Failed to get post");
    assert_eq!(stored.likes_count, 1);
}

#[tokio::test]
async fn like_notifies_the_post_owner() {
    let db = create_test_database().await;
    let author = create_test_user(&db, "notified_author").await;
    let fan = create_test_user(&db, "noisy_fan").await;
    let post = create_test_post(&db, author.id).await;

    db.like_post(fan.id, post.id)
        .await
        .expect("Failed to like post");

    let notifications = db
        .list_notifications(author.id, 10)
        .await
        .expect("Failed to list notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_type, NotificationType::Like);
    assert_eq!(notifications[0].related_id, Some(post.id));

    // Liking your own post stays silent
    db.like_post(author.id, post.id)
        .await
        .expect("Failed to self-like");
    let own = db
        .list_notifications(author.id, 10)
        .await
        .expect("Failed to list notifications");
    assert_eq!(own.len(), 1);
}

#[tokio::test]
async fn comment_counters_follow_creates_and_deletes() {
    let db = create_test_database().await;
    let author = create_test_user(&db, "comment_author").await;
    let reader = create_test_user(&db, "reader").await;
    let post = create_test_post(&db, author.id).await;

    let first = db
        .create_comment(reader.id, post.id, "Nice work!")
        .await
        .expect("Failed to comment");
    db.create_comment(author.id, post.id, "Thanks!")
        .await
        .expect("Failed to comment");

    let stored = db
        .get_post_required(post.id)
        .await
        .expect("Failed to get post");
    assert_eq!(stored.comments_count, 2);

    db.delete_comment(first.id, reader.id)
        .await
        .expect("Failed to delete comment");
    let stored = db
        .get_post_required(post.id)
        .await
        .expect("Failed to get post");
    assert_eq!(stored.comments_count, 1);

    let remaining = db
        .list_comments(post.id, 10)
        .await
        .expect("Failed to list comments");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].content, "Thanks!");
}

#[tokio::test]
async fn deleting_someone_elses_comment_fails() {
    let db = create_test_database().await;
    let author = create_test_user(&db, "touchy_author").await;
    let reader = create_test_user(&db, "other_reader").await;
    let post = create_test_post(&db, author.id).await;

    let comment = db
        .create_comment(reader.id, post.id, "First!")
        .await
        .expect("Failed to comment");

    let err = db
        .delete_comment(comment.id, author.id)
        .await
        .expect_err("Only the comment author may delete");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn accept_is_the_only_path_to_a_follow_edge() {
    let db = create_test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;

    let request = db
        .create_follow_request(alice.id, bob.id)
        .await
        .expect("Failed to create follow request");
    assert_eq!(request.status, FollowRequestStatus::Pending);
    assert!(db
        .get_follow(alice.id, bob.id)
        .await
        .expect("Failed to get follow")
        .is_none());

    let accepted = db
        .accept_follow_request(request.id)
        .await
        .expect("Failed to accept follow request");
    assert_eq!(accepted.status, FollowRequestStatus::Accepted);
    assert!(db
        .get_follow(alice.id, bob.id)
        .await
        .expect("Failed to get follow")
        .is_some());

    // Follower counters were recounted on both sides
    let alice_row = db
        .get_user_required(alice.id)
        .await
        .expect("Failed to get user");
    let bob_row = db
        .get_user_required(bob.id)
        .await
        .expect("Failed to get user");
    assert_eq!(alice_row.following_count, 1);
    assert_eq!(alice_row.followers_count, 0);
    assert_eq!(bob_row.followers_count, 1);
    assert_eq!(bob_row.following_count, 0);
}

#[tokio::test]
async fn duplicate_accept_is_idempotent() {
    let db = create_test_database().await;
    let alice = create_test_user(&db, "alice_idem").await;
    let bob = create_test_user(&db, "bob_idem").await;

    let request = db
        .create_follow_request(alice.id, bob.id)
        .await
        .expect("Failed to create follow request");
    db.accept_follow_request(request.id)
        .await
        .expect("Failed to accept");
    db.accept_follow_request(request.id)
        .await
        .expect("Duplicate accept must not fail");

    let bob_row = db
        .get_user_required(bob.id)
        .await
        .expect("Failed to get user");
    assert_eq!(bob_row.followers_count, 1);
}

#[tokio::test]
async fn rejection_is_terminal() {
    let db = create_test_database().await;
    let alice = create_test_user(&db, "alice_rej").await;
    let bob = create_test_user(&db, "bob_rej").await;

    let request = db
        .create_follow_request(alice.id, bob.id)
        .await
        .expect("Failed to create follow request");
    let rejected = db
        .reject_follow_request(request.id)
        .await
        .expect("Failed to reject");
    assert_eq!(rejected.status, FollowRequestStatus::Rejected);

    // No un-reject
    let err = db
        .accept_follow_request(request.id)
        .await
        .expect_err("Accept after reject must fail");
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(db
        .get_follow(alice.id, bob.id)
        .await
        .expect("Failed to get follow")
        .is_none());

    // And the other direction: no reject after accept
    let carol = create_test_user(&db, "carol_rej").await;
    let request = db
        .create_follow_request(alice.id, carol.id)
        .await
        .expect("Failed to create follow request");
    db.accept_follow_request(request.id)
        .await
        .expect("Failed to accept");
    let err = db
        .reject_follow_request(request.id)
        .await
        .expect_err("Reject after accept must fail");
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn unfollow_recounts_both_sides() {
    let db = create_test_database().await;
    let alice = create_test_user(&db, "alice_un").await;
    let bob = create_test_user(&db, "bob_un").await;

    let request = db
        .create_follow_request(alice.id, bob.id)
        .await
        .expect("Failed to create follow request");
    db.accept_follow_request(request.id)
        .await
        .expect("Failed to accept");

    db.unfollow(alice.id, bob.id)
        .await
        .expect("Failed to unfollow");

    let alice_row = db
        .get_user_required(alice.id)
        .await
        .expect("Failed to get user");
    let bob_row = db
        .get_user_required(bob.id)
        .await
        .expect("Failed to get user");
    assert_eq!(alice_row.following_count, 0);
    assert_eq!(bob_row.followers_count, 0);
}

#[tokio::test]
async fn self_follow_and_duplicate_requests_are_rejected() {
    let db = create_test_database().await;
    let alice = create_test_user(&db, "alice_self").await;
    let bob = create_test_user(&db, "bob_dup").await;

    let err = db
        .create_follow_request(alice.id, alice.id)
        .await
        .expect_err("Self-follow must be rejected");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    db.create_follow_request(alice.id, bob.id)
        .await
        .expect("Failed to create follow request");
    let err = db
        .create_follow_request(alice.id, bob.id)
        .await
        .expect_err("Duplicate request must be rejected");
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn feed_shows_own_and_followed_posts_only() {
    let db = create_test_database().await;
    let alice = create_test_user(&db, "alice_feed").await;
    let bob = create_test_user(&db, "bob_feed").await;
    let carol = create_test_user(&db, "carol_feed").await;

    create_test_post(&db, alice.id).await;
    create_test_post(&db, bob.id).await;
    create_test_post(&db, carol.id).await;

    let request = db
        .create_follow_request(alice.id, bob.id)
        .await
        .expect("Failed to create follow request");
    db.accept_follow_request(request.id)
        .await
        .expect("Failed to accept");

    let feed = db.list_feed(alice.id, 10).await.expect("Failed to list feed");
    assert_eq!(feed.len(), 2);
    assert!(feed
        .iter()
        .all(|p| p.user_id == alice.id || p.user_id == bob.id));
}
