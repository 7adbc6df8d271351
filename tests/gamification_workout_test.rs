// ABOUTME: End-to-end tests for workout completion: points, streaks, ledger
// ABOUTME: Covers idempotent replay, weekly bonus, and total mirroring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::{create_session_minutes, create_test_harness, create_test_user, set_streak_state};

#[tokio::test]
async fn first_workout_awards_base_points_and_starts_streak() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "first_workout").await;
    let session = create_session_minutes(&harness.db, user.id, 30).await;

    let outcome = harness
        .completion
        .complete_session(session.id, None)
        .await
        .expect("Failed to complete session");

    assert!(outcome.newly_completed);
    assert_eq!(outcome.base_points, 60); // 30 min * 2 points/min
    assert_eq!(outcome.streak_bonus, 0);
    assert_eq!(outcome.current_streak, 1);
    assert_eq!(outcome.session.points_earned, 60);
    assert!(outcome.session.is_completed);

    let score = harness
        .db
        .get_score(user.id)
        .await
        .expect("Failed to get score")
        .expect("Score entry missing");
    assert_eq!(score.points, 60);
    assert_eq!(score.workouts_completed, 1);

    let stored = harness
        .db
        .get_user_required(user.id)
        .await
        .expect("Failed to get user");
    assert_eq!(stored.current_streak, 1);
    assert_eq!(stored.longest_streak, 1);
    assert_eq!(stored.total_points, 60);
    assert!(stored.last_activity.is_some());
}

#[tokio::test]
async fn completing_twice_is_a_no_op() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "replay").await;
    let session = create_session_minutes(&harness.db, user.id, 45).await;

    let first = harness
        .completion
        .complete_session(session.id, None)
        .await
        .expect("Failed to complete session");
    assert!(first.newly_completed);

    let second = harness
        .completion
        .complete_session(session.id, None)
        .await
        .expect("Replay must not fail");
    assert!(!second.newly_completed);
    assert_eq!(second.session.points_earned, first.session.points_earned);

    let score = harness
        .db
        .get_score(user.id)
        .await
        .expect("Failed to get score")
        .expect("Score entry missing");
    assert_eq!(score.points, 90); // once, not twice
    assert_eq!(score.workouts_completed, 1);
}

#[tokio::test]
async fn seventh_consecutive_day_awards_weekly_bonus() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "weekly_bonus").await;

    // Six consecutive days already on the books, last one yesterday
    set_streak_state(
        &harness.db,
        user.id,
        Some(Utc::now() - Duration::days(1)),
        6,
        6,
    )
    .await;

    let session = create_session_minutes(&harness.db, user.id, 30).await;
    let outcome = harness
        .completion
        .complete_session(session.id, None)
        .await
        .expect("Failed to complete session");

    assert_eq!(outcome.current_streak, 7);
    assert_eq!(outcome.base_points, 60);
    assert_eq!(outcome.streak_bonus, 50);
    assert_eq!(outcome.session.points_earned, 110);

    let score = harness
        .db
        .get_score(user.id)
        .await
        .expect("Failed to get score")
        .expect("Score entry missing");
    assert_eq!(score.points, 110);

    let stored = harness
        .db
        .get_user_required(user.id)
        .await
        .expect("Failed to get user");
    assert_eq!(stored.longest_streak, 7);
    assert_eq!(stored.total_points, 110);
}

#[tokio::test]
async fn two_week_streak_doubles_the_bonus() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "fortnight").await;
    set_streak_state(
        &harness.db,
        user.id,
        Some(Utc::now() - Duration::days(1)),
        13,
        13,
    )
    .await;

    let session = create_session_minutes(&harness.db, user.id, 10).await;
    let outcome = harness
        .completion
        .complete_session(session.id, None)
        .await
        .expect("Failed to complete session");

    assert_eq!(outcome.current_streak, 14);
    assert_eq!(outcome.streak_bonus, 100);
}

#[tokio::test]
async fn same_day_second_workout_keeps_streak_flat() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "two_a_day").await;

    let first = create_session_minutes(&harness.db, user.id, 20).await;
    harness
        .completion
        .complete_session(first.id, None)
        .await
        .expect("Failed to complete first session");

    let second = create_session_minutes(&harness.db, user.id, 25).await;
    let outcome = harness
        .completion
        .complete_session(second.id, None)
        .await
        .expect("Failed to complete second session");

    // Streak unchanged, but the second workout still earns its points
    assert_eq!(outcome.current_streak, 1);
    assert_eq!(outcome.base_points, 50);

    let score = harness
        .db
        .get_score(user.id)
        .await
        .expect("Failed to get score")
        .expect("Score entry missing");
    assert_eq!(score.points, 40 + 50);
    assert_eq!(score.workouts_completed, 2);
}

#[tokio::test]
async fn broken_streak_resets_to_one() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "lapsed").await;
    set_streak_state(
        &harness.db,
        user.id,
        Some(Utc::now() - Duration::days(3)),
        9,
        12,
    )
    .await;

    let session = create_session_minutes(&harness.db, user.id, 30).await;
    let outcome = harness
        .completion
        .complete_session(session.id, None)
        .await
        .expect("Failed to complete session");

    assert_eq!(outcome.current_streak, 1);
    let stored = harness
        .db
        .get_user_required(user.id)
        .await
        .expect("Failed to get user");
    assert_eq!(stored.current_streak, 1);
    assert_eq!(stored.longest_streak, 12);
}

#[tokio::test]
async fn explicit_end_time_drives_the_award() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "explicit_end").await;

    let start = Utc::now() - Duration::minutes(90);
    let session = stride_server::models::WorkoutSession::start(user.id, "Long ride", start);
    harness
        .db
        .create_workout_session(&session)
        .await
        .expect("Failed to create session");

    let outcome = harness
        .completion
        .complete_session(session.id, Some(start + Duration::minutes(60)))
        .await
        .expect("Failed to complete session");

    assert_eq!(outcome.base_points, 120); // 60 minutes, not 90
}
