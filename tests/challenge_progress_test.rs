// ABOUTME: Tests for challenge progress aggregation and completion bonuses
// ABOUTME: Progress recomputes from scratch; completion never reverts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    create_session_minutes, create_test_harness, create_test_user, create_window_challenge, today,
};
use stride_server::models::{ChallengeTargetType, DailyActivity};
use uuid::Uuid;

async fn log_steps(
    harness: &common::TestHarness,
    user_id: Uuid,
    steps: i64,
    distance: f64,
) {
    harness
        .db
        .upsert_daily_activity(&DailyActivity {
            id: Uuid::new_v4(),
            user_id,
            date: today(),
            steps,
            distance,
            calories_burned: 0.0,
            active_minutes: 0,
        })
        .await
        .expect("Failed to upsert activity");
    harness
        .aggregator
        .on_daily_activity(user_id, today())
        .await
        .expect("Failed to recompute challenges");
}

#[tokio::test]
async fn steps_challenge_tracks_progress_and_completes_once() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "stepper").await;
    let challenge =
        create_window_challenge(&harness.db, user.id, 10_000, ChallengeTargetType::Steps).await;
    harness
        .db
        .join_challenge(challenge.id, user.id)
        .await
        .expect("Failed to join challenge");

    log_steps(&harness, user.id, 6_000, 0.0).await;
    let progress = harness
        .db
        .get_challenge_progress(user.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .expect("Progress row missing");
    assert!((progress.progress - 6_000.0).abs() < f64::EPSILON);
    assert!(!progress.completed);

    log_steps(&harness, user.id, 12_000, 0.0).await;
    let progress = harness
        .db
        .get_challenge_progress(user.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .expect("Progress row missing");
    assert!(progress.completed);
    assert!(progress.completed_at.is_some());

    // Completion bonus lands on the score ledger exactly once
    let score = harness
        .db
        .get_score(user.id)
        .await
        .expect("Failed to get score")
        .expect("Score entry missing");
    assert_eq!(score.points, harness.config.challenge_completion_points);

    // A challenge notification was delivered
    let notifications = harness
        .db
        .list_notifications(user.id, 10)
        .await
        .expect("Failed to list notifications");
    assert!(notifications
        .iter()
        .any(|n| n.related_id == Some(challenge.id)));

    // Further recomputation never re-awards
    log_steps(&harness, user.id, 15_000, 0.0).await;
    let score = harness
        .db
        .get_score(user.id)
        .await
        .expect("Failed to get score")
        .expect("Score entry missing");
    assert_eq!(score.points, harness.config.challenge_completion_points);
}

#[tokio::test]
async fn retroactive_delete_lowers_progress_but_not_completion() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "retro").await;
    let challenge =
        create_window_challenge(&harness.db, user.id, 5_000, ChallengeTargetType::Steps).await;
    harness
        .db
        .join_challenge(challenge.id, user.id)
        .await
        .expect("Failed to join challenge");

    log_steps(&harness, user.id, 8_000, 0.0).await;
    let progress = harness
        .db
        .get_challenge_progress(user.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .expect("Progress row missing");
    assert!(progress.completed);

    // Delete the contributing row and recompute
    harness
        .db
        .delete_daily_activity(user.id, today())
        .await
        .expect("Failed to delete activity");
    let recomputed = harness
        .aggregator
        .on_daily_activity(user.id, today())
        .await
        .expect("Failed to recompute challenges");

    let row = recomputed
        .iter()
        .find(|p| p.challenge_id == challenge.id)
        .expect("Progress row missing after recompute");
    assert!((row.progress - 0.0).abs() < f64::EPSILON);
    assert!(row.completed, "completion is one-way");
}

#[tokio::test]
async fn distance_challenge_sums_kilometres() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "roadrunner").await;
    let challenge =
        create_window_challenge(&harness.db, user.id, 10, ChallengeTargetType::Distance).await;
    harness
        .db
        .join_challenge(challenge.id, user.id)
        .await
        .expect("Failed to join challenge");

    log_steps(&harness, user.id, 0, 4.5).await;
    let progress = harness
        .db
        .get_challenge_progress(user.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .expect("Progress row missing");
    assert!((progress.progress - 4.5).abs() < f64::EPSILON);
    assert!(!progress.completed);
}

#[tokio::test]
async fn workouts_challenge_counts_completed_sessions() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "counter").await;
    let challenge =
        create_window_challenge(&harness.db, user.id, 2, ChallengeTargetType::Workouts).await;
    harness
        .db
        .join_challenge(challenge.id, user.id)
        .await
        .expect("Failed to join challenge");

    let first = create_session_minutes(&harness.db, user.id, 30).await;
    harness
        .completion
        .complete_session(first.id, None)
        .await
        .expect("Failed to complete session");

    let progress = harness
        .db
        .get_challenge_progress(user.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .expect("Progress row missing");
    assert!((progress.progress - 1.0).abs() < f64::EPSILON);
    assert!(!progress.completed);

    let second = create_session_minutes(&harness.db, user.id, 30).await;
    harness
        .completion
        .complete_session(second.id, None)
        .await
        .expect("Failed to complete session");

    let progress = harness
        .db
        .get_challenge_progress(user.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .expect("Progress row missing");
    assert!((progress.progress - 2.0).abs() < f64::EPSILON);
    assert!(progress.completed);
}

#[tokio::test]
async fn points_challenge_sums_workout_awards() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "pointsman").await;
    let challenge =
        create_window_challenge(&harness.db, user.id, 1_000, ChallengeTargetType::Points).await;
    harness
        .db
        .join_challenge(challenge.id, user.id)
        .await
        .expect("Failed to join challenge");

    let session = create_session_minutes(&harness.db, user.id, 30).await;
    harness
        .completion
        .complete_session(session.id, None)
        .await
        .expect("Failed to complete session");

    let progress = harness
        .db
        .get_challenge_progress(user.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .expect("Progress row missing");
    assert!((progress.progress - 60.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn inactive_and_non_covering_challenges_are_skipped() {
    let harness = create_test_harness().await;
    let user = create_test_user(&harness.db, "skipped").await;

    let inactive =
        create_window_challenge(&harness.db, user.id, 100, ChallengeTargetType::Steps).await;
    harness
        .db
        .join_challenge(inactive.id, user.id)
        .await
        .expect("Failed to join challenge");
    harness
        .db
        .deactivate_challenge(inactive.id)
        .await
        .expect("Failed to deactivate challenge");

    log_steps(&harness, user.id, 500, 0.0).await;

    assert!(harness
        .db
        .get_challenge_progress(user.id, inactive.id)
        .await
        .expect("Failed to get progress")
        .is_none());
}

#[tokio::test]
async fn non_participants_accrue_nothing() {
    let harness = create_test_harness().await;
    let owner = create_test_user(&harness.db, "owner").await;
    let bystander = create_test_user(&harness.db, "bystander").await;
    let challenge =
        create_window_challenge(&harness.db, owner.id, 100, ChallengeTargetType::Steps).await;
    // Only the owner joins
    harness
        .db
        .join_challenge(challenge.id, owner.id)
        .await
        .expect("Failed to join challenge");

    log_steps(&harness, bystander.id, 5_000, 0.0).await;

    assert!(harness
        .db
        .get_challenge_progress(bystander.id, challenge.id)
        .await
        .expect("Failed to get progress")
        .is_none());
}
