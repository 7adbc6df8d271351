// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, service, and fixture creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use stride_server::cache::memory::InMemoryCache;
use stride_server::config::GamificationConfig;
use stride_server::database::Database;
use stride_server::gamification::{
    ChallengeProgressAggregator, UserLockRegistry, WorkoutCompletionHandler,
};
use stride_server::leaderboard::LeaderboardService;
use stride_server::models::{Challenge, ChallengeTargetType, User, WorkoutSession};

/// Fully wired services over one in-memory database
pub struct TestHarness {
    pub db: Database,
    pub cache: Arc<InMemoryCache>,
    pub completion: WorkoutCompletionHandler,
    pub aggregator: ChallengeProgressAggregator,
    pub leaderboard: LeaderboardService,
    pub config: GamificationConfig,
}

pub async fn create_test_database() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

pub async fn create_test_harness() -> TestHarness {
    let db = create_test_database().await;
    let cache = Arc::new(InMemoryCache::new());
    let config = GamificationConfig::default();
    let locks = Arc::new(UserLockRegistry::new());

    let aggregator = ChallengeProgressAggregator::new(
        db.clone(),
        cache.clone(),
        Arc::clone(&locks),
        config.clone(),
    );
    let completion = WorkoutCompletionHandler::new(
        db.clone(),
        cache.clone(),
        locks,
        config.clone(),
        aggregator.clone(),
    );
    let leaderboard = LeaderboardService::new(db.clone(), cache.clone(), config.leaderboard_size);

    TestHarness {
        db,
        cache,
        completion,
        aggregator,
        leaderboard,
        config,
    }
}

pub async fn create_test_user(db: &Database, username: &str) -> User {
    let user = User::new(format!("{username}@example.com"), username.to_owned());
    db.create_user(&user).await.expect("Failed to create user");
    user
}

/// Create an incomplete session of the given duration ending now
pub async fn create_session_minutes(
    db: &Database,
    user_id: Uuid,
    minutes: i64,
) -> WorkoutSession {
    let start = Utc::now() - chrono::Duration::minutes(minutes);
    let session = WorkoutSession::start(user_id, "Morning workout", start);
    db.create_workout_session(&session)
        .await
        .expect("Failed to create session");
    session
}

/// Create an active challenge whose window surrounds today
pub async fn create_window_challenge(
    db: &Database,
    created_by: Uuid,
    target: i64,
    target_type: ChallengeTargetType,
) -> Challenge {
    let today = Utc::now().date_naive();
    let challenge = Challenge {
        id: Uuid::new_v4(),
        name: format!("{target_type:?} challenge"),
        description: String::new(),
        start_date: today - chrono::Duration::days(7),
        end_date: today + chrono::Duration::days(7),
        target,
        target_type,
        created_by,
        is_active: true,
    };
    db.create_challenge(&challenge)
        .await
        .expect("Failed to create challenge");
    challenge
}

/// Backdate a user's streak state, bypassing the gamification services
pub async fn set_streak_state(
    db: &Database,
    user_id: Uuid,
    last_activity: Option<DateTime<Utc>>,
    current_streak: i32,
    longest_streak: i32,
) {
    sqlx::query(
        "UPDATE users SET last_activity = $2, current_streak = $3, longest_streak = $4 WHERE id = $1",
    )
    .bind(user_id.to_string())
    .bind(last_activity)
    .bind(current_streak)
    .bind(longest_streak)
    .execute(db.pool())
    .await
    .expect("Failed to set streak state");
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
