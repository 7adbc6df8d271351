// ABOUTME: Workout completion orchestration: points, streak, ledger, cache
// ABOUTME: One atomic transaction per completion; replays are no-ops
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::LeaderboardCache;
use crate::config::GamificationConfig;
use crate::constants::GLOBAL_LEADERBOARD_CACHE_KEY;
use crate::database::scores::credit_points;
use crate::database::workouts::row_to_session;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::gamification::challenges::ChallengeProgressAggregator;
use crate::gamification::locks::UserLockRegistry;
use crate::gamification::{points, streak};
use crate::models::WorkoutSession;

/// Result of a completion attempt
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// The session after completion
    pub session: WorkoutSession,
    /// Base points awarded for the duration
    pub base_points: i64,
    /// Weekly streak bonus awarded on top, zero off the boundary
    pub streak_bonus: i64,
    /// The user's streak after this completion
    pub current_streak: i32,
    /// False when the session was already completed and nothing changed.
    /// On a replay `base_points` carries the stored total award and the
    /// bonus breakdown is reported as zero.
    pub newly_completed: bool,
}

/// Orchestrates a workout session's incomplete→complete transition
///
/// Steps run in order inside one transaction: base points, score ledger,
/// session terminal fields, streak, weekly bonus. Challenge aggregation
/// and cache invalidation follow the commit, still under the user's lock.
#[derive(Clone)]
pub struct WorkoutCompletionHandler {
    db: Database,
    cache: Arc<dyn LeaderboardCache>,
    locks: Arc<UserLockRegistry>,
    config: GamificationConfig,
    aggregator: ChallengeProgressAggregator,
}

impl WorkoutCompletionHandler {
    /// Create a new handler
    #[must_use]
    pub fn new(
        db: Database,
        cache: Arc<dyn LeaderboardCache>,
        locks: Arc<UserLockRegistry>,
        config: GamificationConfig,
        aggregator: ChallengeProgressAggregator,
    ) -> Self {
        Self {
            db,
            cache,
            locks,
            config,
            aggregator,
        }
    }

    /// Complete a workout session
    ///
    /// Uses `end_time` when given, otherwise the session's stored end
    /// time, otherwise now. Completing an already-completed session is a
    /// safe no-op: the stored award is returned and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or a database
    /// operation fails; on error no rows are modified
    pub async fn complete_session(
        &self,
        session_id: Uuid,
        end_time: Option<DateTime<Utc>>,
    ) -> AppResult<CompletionOutcome> {
        let session = self.db.get_workout_session_required(session_id).await?;
        if session.is_completed {
            return self.replay_outcome(session).await;
        }

        let user_id = session.user_id;
        let _guard = self.locks.lock(user_id).await;

        let now = Utc::now();
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        // Re-read under the lock: a racing completion may have won
        let row = sqlx::query(
            r"
            SELECT id, user_id, workout_plan_id, name, notes, start_time, end_time,
                   calories_burned, points_earned, is_completed
            FROM workout_sessions WHERE id = $1
            ",
        )
        .bind(session_id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to re-read session: {e}")))?;
        let mut session = row_to_session(&row)?;
        if session.is_completed {
            drop(tx);
            return self.replay_outcome(session).await;
        }

        let end = end_time.or(session.end_time).unwrap_or(now);
        let duration_minutes = (end - session.start_time).num_seconds() as f64 / 60.0;
        let base_points = points::workout_points(duration_minutes, self.config.points_per_minute);

        credit_points(&mut tx, user_id, base_points, true, now).await?;

        sqlx::query(
            r"
            UPDATE workout_sessions
            SET end_time = $2, points_earned = $3, is_completed = TRUE
            WHERE id = $1
            ",
        )
        .bind(session_id.to_string())
        .bind(end)
        .bind(base_points)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete session: {e}")))?;

        let streak_update = self.advance_streak(&mut tx, user_id, now).await?;

        // Bonus applies to the streak after the update, whether or not
        // this completion moved it: every workout completed on a
        // multiple-of-7 day qualifies
        let bonus = points::streak_bonus(streak_update.current_streak, self.config.streak_bonus_points);
        if bonus > 0 {
            credit_points(&mut tx, user_id, bonus, false, now).await?;
            sqlx::query(
                "UPDATE workout_sessions SET points_earned = points_earned + $2 WHERE id = $1",
            )
            .bind(session_id.to_string())
            .bind(bonus)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to add streak bonus: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit completion: {e}")))?;

        // Still under the user's lock: challenge progress, then the cache
        self.aggregator
            .recompute_for_date(user_id, session.start_time.date_naive())
            .await?;
        self.cache.invalidate(GLOBAL_LEADERBOARD_CACHE_KEY).await?;

        session.end_time = Some(end);
        session.points_earned = base_points + bonus;
        session.is_completed = true;

        Ok(CompletionOutcome {
            session,
            base_points,
            streak_bonus: bonus,
            current_streak: streak_update.current_streak,
            newly_completed: true,
        })
    }

    /// Run the streak calculator against the user row inside the transaction
    async fn advance_streak(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<streak::StreakUpdate> {
        let row = sqlx::query(
            "SELECT last_activity, current_streak, longest_streak FROM users WHERE id = $1",
        )
        .bind(user_id.to_string())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to read streak state: {e}")))?;

        let state = streak::StreakState {
            last_activity: row.get("last_activity"),
            current_streak: row.get("current_streak"),
            longest_streak: row.get("longest_streak"),
        };

        let update = streak::advance(&state, now);
        if update.changed {
            sqlx::query(
                r"
                UPDATE users
                SET current_streak = $2, longest_streak = $3, last_activity = $4
                WHERE id = $1
                ",
            )
            .bind(user_id.to_string())
            .bind(update.current_streak)
            .bind(update.longest_streak)
            .bind(now)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to persist streak: {e}")))?;
        }

        Ok(update)
    }

    /// Outcome for a session that was already completed
    async fn replay_outcome(&self, session: WorkoutSession) -> AppResult<CompletionOutcome> {
        let user = self.db.get_user_required(session.user_id).await?;
        Ok(CompletionOutcome {
            base_points: session.points_earned,
            streak_bonus: 0,
            current_streak: user.current_streak,
            newly_completed: false,
            session,
        })
    }
}
